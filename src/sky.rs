//! Sky-condition classification.
//!
//! A fixed cascade maps an hour's (or month's) aggregates to a nominal
//! condition. Thresholds are part of the engine's contract with its
//! consumers: rain probability breaks at 20/35/55/70 %, hourly depth at
//! 0.3/1.5/3/7 mm, and night is radiation below 15 W/m².

use crate::data::{HourRow, MonthSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkyCondition {
    Storm,
    Snow,
    HeavyRain,
    Rain,
    Shower,
    LightRain,
    Fog,
    Overcast,
    PartlyCloudy,
    Sunny,
    ClearNight,
    CloudyNight,
}

impl SkyCondition {
    pub fn label(self) -> &'static str {
        match self {
            SkyCondition::Storm => "storm",
            SkyCondition::Snow => "snow",
            SkyCondition::HeavyRain => "heavy rain",
            SkyCondition::Rain => "rain",
            SkyCondition::Shower => "showers",
            SkyCondition::LightRain => "light rain",
            SkyCondition::Fog => "fog",
            SkyCondition::Overcast => "overcast",
            SkyCondition::PartlyCloudy => "partly cloudy",
            SkyCondition::Sunny => "sunny",
            SkyCondition::ClearNight => "clear night",
            SkyCondition::CloudyNight => "cloudy night",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            SkyCondition::Storm => "\u{26C8}",
            SkyCondition::Snow => "\u{2744}",
            SkyCondition::HeavyRain | SkyCondition::Rain => "\u{1F327}",
            SkyCondition::Shower => "\u{1F326}",
            SkyCondition::LightRain => "\u{1F327}",
            SkyCondition::Fog => "\u{1F32B}",
            SkyCondition::Overcast => "\u{2601}",
            SkyCondition::PartlyCloudy => "\u{26C5}",
            SkyCondition::Sunny => "\u{1F31E}",
            SkyCondition::ClearNight => "\u{1F319}",
            SkyCondition::CloudyNight => "\u{2601}",
        }
    }
}

/// Classify one hour. Precipitation conditions are gated on both
/// probability and measurable depth, so a high probability of trace rain
/// cascades down to the cloud-cover levels.
pub fn classify_hour(row: &HourRow) -> SkyCondition {
    let temp = row.temp;
    let sol = row.sol;
    let rain = row.rain;
    let mm = row.mm;
    let p25 = row.temp_p25.or(temp);
    let night = sol < 15.0;
    let snowing = row.snow > 0.1 || (p25.is_some_and(|p| p <= 2.0) && mm > 0.1);
    let freezing = temp.is_some_and(|t| t <= 0.0);

    if mm > 7.0 || (rain > 70.0 && mm > 2.0) {
        return SkyCondition::Storm;
    }
    if (snowing && rain > 15.0) || (freezing && rain > 20.0) {
        return SkyCondition::Snow;
    }
    if night {
        if rain > 35.0 && mm >= 1.5 {
            return SkyCondition::Rain;
        }
        if rain > 20.0 && mm >= 0.3 {
            return SkyCondition::Shower;
        }
        return if sol < 5.0 { SkyCondition::ClearNight } else { SkyCondition::CloudyNight };
    }
    if rain > 55.0 && mm >= 3.0 {
        return SkyCondition::HeavyRain;
    }
    if rain > 35.0 && mm >= 1.5 {
        return SkyCondition::Rain;
    }
    if rain > 20.0 && mm >= 0.3 {
        return if sol >= 200.0 { SkyCondition::Shower } else { SkyCondition::LightRain };
    }
    if sol < 60.0 && temp.is_some_and(|t| t < 8.0) {
        return SkyCondition::Fog;
    }
    if sol < 130.0 {
        SkyCondition::Overcast
    } else if sol < 420.0 {
        SkyCondition::PartlyCloudy
    } else {
        SkyCondition::Sunny
    }
}

/// Classify a month's overall character from its aggregates.
///
/// Warm sunny climates get a tropical discount on the rain-day share:
/// convective rain falls in short bursts with sun in between, so the raw
/// frequency overstates how wet a visit feels.
pub fn classify_month(m: &MonthSummary) -> SkyCondition {
    let sun = m.sun_hours.unwrap_or(0.0);
    let pct = m.rain_pct;

    let snow_temp = m.tmin.or(m.avg_temp);
    if snow_temp.is_some_and(|t| t <= 2.0) && pct > 15.0 {
        return SkyCondition::Snow;
    }

    let avg_temp = m.avg_temp.or(m.tmax.map(|t| t - 4.0));
    let eff_pct = match avg_temp {
        Some(t) if t >= 22.0 && sun >= 4.0 => {
            let factor = if t >= 24.0 { 0.55 } else { 0.55 + (24.0 - t) / 2.0 * 0.10 };
            pct * factor
        }
        _ => pct,
    };

    if (eff_pct <= 25.0 && sun >= 6.0) || (eff_pct <= 35.0 && sun >= 8.0) {
        SkyCondition::Sunny
    } else if (eff_pct <= 55.0 && sun >= 7.0) || (eff_pct <= 45.0 && sun >= 5.0) {
        SkyCondition::Shower
    } else if (eff_pct <= 45.0 && sun >= 3.0) || eff_pct <= 35.0 {
        SkyCondition::PartlyCloudy
    } else if eff_pct <= 65.0 && sun >= 3.0 {
        SkyCondition::LightRain
    } else if eff_pct <= 80.0 {
        SkyCondition::Rain
    } else {
        SkyCondition::HeavyRain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(temp: f64, sol: f64, rain: f64, mm: f64) -> HourRow {
        HourRow {
            temp: Some(temp),
            temp_p25: Some(temp),
            rain,
            mm,
            sol,
            ..HourRow::empty(12)
        }
    }

    #[test]
    fn storm_outranks_everything() {
        assert_eq!(classify_hour(&row(20.0, 500.0, 10.0, 8.0)), SkyCondition::Storm);
        assert_eq!(classify_hour(&row(20.0, 2.0, 75.0, 2.5)), SkyCondition::Storm);
    }

    #[test]
    fn snow_needs_cold_and_precipitation() {
        assert_eq!(classify_hour(&row(-2.0, 100.0, 30.0, 0.5)), SkyCondition::Snow);
        let mut snowy = row(1.5, 100.0, 20.0, 0.5);
        snowy.snow = 0.3;
        assert_eq!(classify_hour(&snowy), SkyCondition::Snow);
        // Warm rain at the same probability is not snow.
        assert_eq!(classify_hour(&row(15.0, 100.0, 30.0, 0.5)), SkyCondition::LightRain);
    }

    #[test]
    fn trace_rain_cascades_to_cloud_levels() {
        // 40% probability but under 0.3mm: not a rain condition.
        assert_eq!(classify_hour(&row(20.0, 500.0, 33.0, 0.1)), SkyCondition::Sunny);
        assert_eq!(classify_hour(&row(20.0, 200.0, 33.0, 0.1)), SkyCondition::PartlyCloudy);
    }

    #[test]
    fn rain_intensity_ladder() {
        assert_eq!(classify_hour(&row(18.0, 300.0, 60.0, 3.5)), SkyCondition::HeavyRain);
        assert_eq!(classify_hour(&row(18.0, 300.0, 40.0, 2.0)), SkyCondition::Rain);
        assert_eq!(classify_hour(&row(18.0, 300.0, 25.0, 0.5)), SkyCondition::Shower);
        assert_eq!(classify_hour(&row(18.0, 100.0, 25.0, 0.5)), SkyCondition::LightRain);
    }

    #[test]
    fn night_levels() {
        assert_eq!(classify_hour(&row(10.0, 2.0, 5.0, 0.0)), SkyCondition::ClearNight);
        assert_eq!(classify_hour(&row(10.0, 10.0, 5.0, 0.0)), SkyCondition::CloudyNight);
        assert_eq!(classify_hour(&row(10.0, 2.0, 40.0, 2.0)), SkyCondition::Rain);
    }

    #[test]
    fn fog_needs_dim_and_cold() {
        assert_eq!(classify_hour(&row(5.0, 40.0, 5.0, 0.0)), SkyCondition::Fog);
        assert_eq!(classify_hour(&row(15.0, 40.0, 5.0, 0.0)), SkyCondition::Overcast);
    }

    fn month(avg: f64, rain: f64, sun: f64) -> MonthSummary {
        MonthSummary {
            avg_temp: Some(avg),
            tmin: Some(avg - 5.0),
            tmax: Some(avg + 5.0),
            rain_pct: rain,
            sun_hours: Some(sun),
            ..MonthSummary::empty(7)
        }
    }

    #[test]
    fn tropical_discount_keeps_warm_months_sunny() {
        // 40% rain days would read as showers in a cool climate, but a hot
        // sunny month discounts to 22%.
        assert_eq!(classify_month(&month(28.0, 40.0, 9.0)), SkyCondition::Sunny);
        assert_eq!(classify_month(&month(15.0, 40.0, 9.0)), SkyCondition::Shower);
    }

    #[test]
    fn cold_wet_month_reads_as_snow() {
        assert_eq!(classify_month(&month(3.0, 40.0, 2.0)), SkyCondition::Snow);
    }
}
