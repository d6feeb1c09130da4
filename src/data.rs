use chrono::NaiveDate;

/// Geographic coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub latitude: f64,
    pub longitude: f64,
}

/// Finalized per-hour climate summary. An array of 24 of these forms a
/// day's climate profile.
///
/// Percentile-derived fields are `None` when the underlying bucket received
/// no samples; `rain` defaults to 0 in that case. `temp` and `sol` carry the
/// values of the active day scenario (median for the main scenario).
#[derive(Debug, Clone, PartialEq)]
pub struct HourRow {
    /// Hour of day, 0-23.
    pub hour: u8,
    /// Temperature percentiles across the sampled years (°C).
    pub temp_p25: Option<f64>,
    pub temp_p50: Option<f64>,
    pub temp_p75: Option<f64>,
    /// Scenario temperature (°C).
    pub temp: Option<f64>,
    /// Wet-hour fraction, 0-100 (share of sampled hours with >0.1 mm).
    pub rain: f64,
    /// Mean precipitation depth for this hour (mm).
    pub mm: f64,
    /// Mean snowfall (cm).
    pub snow: f64,
    /// Median wind speed (km/h).
    pub wind: Option<f64>,
    /// Shortwave radiation percentiles (W/m², clamped >= 0).
    pub sol_p25: f64,
    pub sol_p50: f64,
    pub sol_p75: f64,
    /// Scenario radiation (W/m²).
    pub sol: f64,
    /// Share of sampled years within ±2 °C of the trended median, 0-100.
    pub temp_freq: Option<u8>,
    /// Mean relative humidity (%).
    pub humidity: Option<f64>,
    /// True when the row comes from a live forecast rather than climatology.
    pub is_forecast: bool,
}

impl HourRow {
    pub fn empty(hour: u8) -> Self {
        HourRow {
            hour,
            temp_p25: None,
            temp_p50: None,
            temp_p75: None,
            temp: None,
            rain: 0.0,
            mm: 0.0,
            snow: 0.0,
            wind: None,
            sol_p25: 0.0,
            sol_p50: 0.0,
            sol_p75: 0.0,
            sol: 0.0,
            temp_freq: None,
            humidity: None,
            is_forecast: false,
        }
    }
}

/// Per-calendar-month climate summary over a decade of daily archive data.
/// Twelve of these form an annual climate profile.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthSummary {
    /// Calendar month, 1-12.
    pub month: u8,
    /// Median daily maximum temperature (°C).
    pub tmax: Option<f64>,
    /// Median daily minimum temperature (°C).
    pub tmin: Option<f64>,
    /// (tmax + tmin) / 2.
    pub avg_temp: Option<f64>,
    /// Share of days with >1 mm precipitation, 0-100.
    pub rain_pct: f64,
    /// Median sunshine hours per day, capped at 14. `None` when the month
    /// had neither sunshine nor radiation samples; a measured zero (polar
    /// winter) stays `Some(0.0)`.
    pub sun_hours: Option<f64>,
    /// Median daily shortwave radiation sum (MJ/m²).
    pub radiation: f64,
    /// Median daily precipitation (mm). Measures intensity, as opposed to
    /// the rain-day frequency in `rain_pct`. Scoring consumes both.
    pub precip_mm: f64,
    /// Reference comfort score on the 0-100 scale (display divides by 10).
    /// Curated for known destinations, otherwise filled by calibration.
    pub fiche_score: Option<u16>,
    /// Seasonal temperature nudge applied to this month (°C), recorded only
    /// when it exceeds the ±0.3 °C noise threshold.
    pub seas_temp_delta: Option<f64>,
    /// Seasonal rain-percentage nudge, recorded only when |delta| >= 3.
    pub seas_rain_delta: Option<i32>,
    /// Guards against applying the seasonal blend twice.
    pub has_seasonal: bool,
}

impl MonthSummary {
    pub fn empty(month: u8) -> Self {
        MonthSummary {
            month,
            tmax: None,
            tmin: None,
            avg_temp: None,
            rain_pct: 0.0,
            sun_hours: None,
            radiation: 0.0,
            precip_mm: 0.0,
            fiche_score: None,
            seas_temp_delta: None,
            seas_rain_delta: None,
            has_seasonal: false,
        }
    }
}

/// Planning horizon for a target date, relative to today. Decides which
/// data source feeds the day pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizon {
    /// The target date is today: live forecast.
    Today,
    /// 1-7 days out: live forecast.
    Live(u16),
    /// 8-210 days out: climatology corrected by the seasonal ensemble.
    Seasonal(u16),
    /// Further out (or in the past): pure climatology.
    Climatology,
}

impl Horizon {
    pub fn classify(target: NaiveDate, today: NaiveDate) -> Self {
        let diff = (target - today).num_days();
        match diff {
            0 => Horizon::Today,
            1..=7 => Horizon::Live(diff as u16),
            8..=210 => Horizon::Seasonal(diff as u16),
            _ => Horizon::Climatology,
        }
    }

    /// Whether the day pipeline should use the live forecast endpoint.
    pub fn is_live(self) -> bool {
        matches!(self, Horizon::Today | Horizon::Live(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, da: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, da).unwrap()
    }

    #[test]
    fn horizon_boundaries() {
        let today = d(2026, 8, 28);
        assert_eq!(Horizon::classify(today, today), Horizon::Today);
        assert_eq!(Horizon::classify(d(2026, 9, 4), today), Horizon::Live(7));
        assert_eq!(Horizon::classify(d(2026, 9, 5), today), Horizon::Seasonal(8));
        assert_eq!(
            Horizon::classify(today + chrono::Duration::days(210), today),
            Horizon::Seasonal(210)
        );
        assert_eq!(
            Horizon::classify(today + chrono::Duration::days(211), today),
            Horizon::Climatology
        );
        // Past dates fall back to climatology.
        assert_eq!(Horizon::classify(d(2020, 1, 1), today), Horizon::Climatology);
    }
}
