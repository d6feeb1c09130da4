//! Activity comfort scoring.
//!
//! Sub-scores map one weather variable to 0-100; the composites combine
//! them per activity. The same formulas serve both the day path (24 hourly
//! rows) and the month path (one monthly summary): the day path converts
//! its peak radiation (W/m²) to equivalent sun hours at /50 so the two
//! agree on shared inputs.

use crate::activity::Activity;
use crate::data::{HourRow, MonthSummary};

/// Rain-probability score, 5 segments with breaks at 10/25/50/80 %.
pub fn score_rain(pct: f64) -> f64 {
    if pct <= 10.0 {
        100.0
    } else if pct <= 25.0 {
        100.0 - (pct - 10.0) * 2.0
    } else if pct <= 50.0 {
        70.0 - (pct - 25.0) * 1.6
    } else if pct <= 80.0 {
        30.0 - (pct - 50.0) * 0.8
    } else {
        (6.0 - (pct - 80.0) * 0.3).max(0.0)
    }
}

/// Rain score discounted by actual intensity. Drizzle under 3 mm/day is
/// barely disruptive, so the probability is scaled down before scoring;
/// serious rain (≥6 mm/day) gets no discount.
pub fn score_rain_smart(pct: f64, mm_day: Option<f64>) -> f64 {
    let effective = match mm_day {
        Some(mm) if mm < 3.0 => pct * (0.40 + mm / 3.0 * 0.30),
        Some(mm) if mm < 6.0 => pct * (0.70 + (mm - 3.0) / 3.0 * 0.30),
        _ => pct,
    };
    score_rain(effective)
}

/// Temperature comfort against a band: 100 at the midpoint, 80 at the
/// edges, then an asymmetric penalty (cold hurts more than heat). An
/// unknown temperature scores a neutral 50.
pub fn score_temp(t: Option<f64>, band: (f64, f64)) -> f64 {
    let t = match t {
        Some(t) => t,
        None => return 50.0,
    };
    let (t_min, t_max) = band;
    let ideal = (t_min + t_max) / 2.0;
    let range = (t_max - t_min) / 2.0;
    if t >= t_min && t <= t_max {
        100.0 - 20.0 * (t - ideal).abs() / range
    } else if t < t_min {
        (80.0 - (t_min - t) * 8.0).max(0.0)
    } else {
        (80.0 - (t - t_max) * 2.0).max(0.0)
    }
}

/// Wind score with breaks at 10/20/40 km/h.
pub fn score_wind(kmh: f64) -> f64 {
    if kmh <= 10.0 {
        100.0
    } else if kmh <= 20.0 {
        100.0 - (kmh - 10.0) * 3.0
    } else if kmh <= 40.0 {
        70.0 - (kmh - 20.0) * 2.5
    } else {
        (20.0 - (kmh - 40.0)).max(0.0)
    }
}

/// Humid-heat malus, 0-20 points. Humidity only matters when it is both
/// warm (>24 °C) and damp (>65 %).
pub fn humidity_malus(rh: Option<f64>, avg_temp: Option<f64>) -> f64 {
    let (rh, t) = match (rh, avg_temp) {
        (Some(rh), Some(t)) => (rh, t),
        _ => return 0.0,
    };
    if t < 24.0 || rh <= 65.0 {
        return 0.0;
    }
    let temp_factor = ((t - 24.0) / 14.0).min(1.0);
    let rh_factor = ((rh - 65.0) / 30.0).min(1.0);
    (20.0 * temp_factor * rh_factor).round()
}

/// Beach variant of the humid-heat malus (0-15 points, higher thresholds:
/// on the water humidity bothers less until it is really muggy).
pub fn beach_humidity_malus(rh: Option<f64>, avg_temp: Option<f64>) -> f64 {
    let (rh, t) = match (rh, avg_temp) {
        (Some(rh), Some(t)) => (rh, t),
        _ => return 0.0,
    };
    if t < 26.0 || rh <= 75.0 {
        return 0.0;
    }
    let temp_factor = ((t - 26.0) / 12.0).min(1.0);
    let rh_factor = ((rh - 75.0) / 20.0).min(1.0);
    (15.0 * temp_factor * rh_factor).round()
}

/// Sunshine score from peak shortwave radiation, breaks at 100/300/600 W/m².
pub fn score_sun(peak_sol: f64) -> f64 {
    if peak_sol >= 600.0 {
        100.0
    } else if peak_sol >= 300.0 {
        60.0 + (peak_sol - 300.0) / 300.0 * 40.0
    } else if peak_sol >= 100.0 {
        20.0 + (peak_sol - 100.0) / 200.0 * 40.0
    } else {
        (peak_sol / 100.0 * 20.0).max(0.0)
    }
}

/// Beach daily-max temperature curve: unusable below 18 °C, peaking over
/// 26-35 °C, then a heat penalty.
fn beach_temp(tmax: f64) -> f64 {
    if tmax < 18.0 {
        0.0
    } else if tmax < 22.0 {
        (tmax - 18.0) / 4.0 * 20.0
    } else if tmax < 26.0 {
        20.0 + (tmax - 22.0) / 4.0 * 60.0
    } else if tmax <= 35.0 {
        80.0 + (tmax - 26.0) / 9.0 * 20.0
    } else if tmax <= 40.0 {
        100.0 - (tmax - 35.0) / 5.0 * 30.0
    } else {
        (70.0 - (tmax - 40.0) * 5.0).max(40.0)
    }
}

/// Ski daily-max temperature curve: dry snow around -2..2 °C, a thaw
/// penalty above 5 °C and nothing above 10 °C.
fn ski_temp(tmax: f64) -> f64 {
    if tmax > 10.0 {
        0.0
    } else if tmax > 5.0 {
        (50.0 - (tmax - 5.0) * 10.0).max(0.0)
    } else if tmax >= -2.0 {
        90.0 + (2.0 - tmax.abs()) * 2.0
    } else if tmax >= -12.0 {
        90.0 - (tmax.abs() - 2.0) * 3.0
    } else {
        (90.0 - (tmax.abs() - 2.0) * 3.0).max(30.0)
    }
}

/// Fresh-snow likelihood: cold plus precipitation.
fn snow_bonus(tmin: f64, mm: f64) -> f64 {
    if tmin < 0.0 && mm > 2.0 {
        (60.0 + mm * 3.0).min(100.0)
    } else if tmin < 0.0 && mm > 0.0 {
        55.0
    } else {
        20.0
    }
}

/// Rain score for skiing: warm rain destroys the snowpack, cold
/// precipitation is mostly harmless.
fn ski_rain(tmax: f64, rain_pct: f64) -> f64 {
    if tmax > 2.0 {
        (100.0 - rain_pct * 1.5).max(0.0)
    } else {
        (100.0 - rain_pct * 0.3).max(40.0)
    }
}

fn sun_hours_score(hours: f64) -> f64 {
    (hours * 8.0).min(100.0)
}

/// Composite score with its sub-score breakdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub total: u8,
    pub rain: f64,
    pub temp: f64,
    pub wind: f64,
    pub sun: f64,
    pub humidity_malus: f64,
}

/// Day-level aggregates over 24 hourly rows, exposed so callers can label
/// scenarios without recomputing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayAggregates {
    pub avg_rain: f64,
    pub avg_wind: f64,
    pub avg_temp: Option<f64>,
    pub avg_humidity: Option<f64>,
    pub tmin: Option<f64>,
    pub tmax: Option<f64>,
    pub total_mm: f64,
    pub total_snow: f64,
    pub peak_sol: f64,
}

pub fn day_aggregates(rows: &[HourRow]) -> DayAggregates {
    let n = rows.len().max(1) as f64;
    let avg_rain = rows.iter().map(|r| r.rain).sum::<f64>() / n;
    let avg_wind = rows.iter().map(|r| r.wind.unwrap_or(0.0)).sum::<f64>() / n;
    let temps: Vec<f64> = rows.iter().filter_map(|r| r.temp).collect();
    let avg_temp = (!temps.is_empty()).then(|| temps.iter().sum::<f64>() / temps.len() as f64);
    let rhs: Vec<f64> = rows.iter().filter_map(|r| r.humidity).collect();
    let avg_humidity = (!rhs.is_empty()).then(|| rhs.iter().sum::<f64>() / rhs.len() as f64);
    DayAggregates {
        avg_rain,
        avg_wind,
        avg_temp,
        avg_humidity,
        tmin: temps.iter().copied().min_by(f64::total_cmp),
        tmax: temps.iter().copied().max_by(f64::total_cmp),
        total_mm: rows.iter().map(|r| r.mm).sum(),
        total_snow: rows.iter().map(|r| r.snow).sum(),
        peak_sol: rows.iter().map(|r| r.sol).fold(0.0, f64::max),
    }
}

/// Score one day profile for `activity`.
pub fn score_day(rows: &[HourRow], activity: Activity) -> ScoreBreakdown {
    let agg = day_aggregates(rows);
    let s_rain = score_rain_smart(agg.avg_rain, Some(agg.total_mm));
    let s_temp = score_temp(agg.avg_temp, activity.comfort_band());
    let s_wind = score_wind(agg.avg_wind);
    let s_sun = score_sun(agg.peak_sol);
    // peak W/m² converts to equivalent sun hours, shared with the month path.
    let sun_hours = agg.peak_sol / 50.0;

    let (total, s_rain, s_temp, s_wind, s_sun, malus) = match activity {
        Activity::Ski => {
            let tmax = agg.tmax.or(agg.avg_temp).unwrap_or(10.0);
            let tmin = agg.tmin.or(agg.avg_temp).unwrap_or(5.0);
            let avg_mm = agg.total_mm / rows.len().max(1) as f64;
            let t = ski_temp(tmax);
            let snow = snow_bonus(tmin, avg_mm);
            let sun = sun_hours_score(sun_hours);
            let rain = ski_rain(tmax, agg.avg_rain);
            let total = (rain * 0.15 + t * 0.40 + snow * 0.20 + sun * 0.25).round();
            (total, rain, t, s_wind, sun, 0.0)
        }
        Activity::Beach => {
            let tmax = agg.tmax.or(agg.avg_temp).unwrap_or(20.0);
            let t = beach_temp(tmax);
            let rain = (100.0 - agg.avg_rain * 1.8).max(0.0);
            let sun = sun_hours_score(sun_hours);
            let malus = beach_humidity_malus(agg.avg_humidity, agg.avg_temp);
            let total = (rain * 0.35 + t * 0.45 + sun * 0.20).round() - malus;
            (total, rain, t, s_wind, sun, malus)
        }
        Activity::General => {
            let w = activity.weights();
            let malus = humidity_malus(agg.avg_humidity, agg.avg_temp);
            let total = (s_rain * f64::from(w.rain) / 100.0
                + s_temp * f64::from(w.temp) / 100.0
                + s_wind * f64::from(w.wind) / 100.0
                + s_sun * f64::from(w.sun) / 100.0)
                .round()
                - malus;
            (total, s_rain, s_temp, s_wind, s_sun, malus)
        }
    };

    ScoreBreakdown {
        total: total.clamp(0.0, 100.0) as u8,
        rain: s_rain,
        temp: s_temp,
        wind: s_wind,
        sun: s_sun,
        humidity_malus: malus,
    }
}

/// Score one month summary for `activity`, 0-100.
///
/// For general travel the calibrated reference score is authoritative
/// when present; beach and ski always compute their own composites from
/// the monthly aggregates.
pub fn score_month(m: &MonthSummary, activity: Activity) -> u8 {
    match activity {
        Activity::General => m.fiche_score.map(|s| s.min(100) as u8).unwrap_or(50),
        Activity::Ski => {
            let tmax = m.tmax.or(m.avg_temp.map(|t| t + 4.0)).unwrap_or(5.0);
            let tmin = m.tmin.or(m.avg_temp.map(|t| t - 4.0)).unwrap_or(0.0);
            let total = ski_rain(tmax, m.rain_pct) * 0.15
                + ski_temp(tmax) * 0.40
                + snow_bonus(tmin, m.precip_mm) * 0.20
                + sun_hours_score(m.sun_hours.unwrap_or(0.0)) * 0.25;
            total.round().clamp(0.0, 100.0) as u8
        }
        Activity::Beach => {
            let tmax = m.tmax.or(m.avg_temp.map(|t| t + 5.0)).unwrap_or(20.0);
            let total = (100.0 - m.rain_pct * 1.8).max(0.0) * 0.35
                + beach_temp(tmax) * 0.45
                + sun_hours_score(m.sun_hours.unwrap_or(0.0)) * 0.20;
            total.round().clamp(0.0, 100.0) as u8
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::HourRow;

    #[test]
    fn rain_score_endpoints_and_monotonicity() {
        assert_eq!(score_rain(0.0), 100.0);
        assert_eq!(score_rain(10.0), 100.0);
        assert_eq!(score_rain(25.0), 70.0);
        assert_eq!(score_rain(50.0), 30.0);
        assert_eq!(score_rain(80.0), 6.0);
        assert_eq!(score_rain(100.0), 0.0);
        let mut prev = f64::INFINITY;
        for pct in 0..=100 {
            let s = score_rain(f64::from(pct));
            assert!(s <= prev, "not monotonic at {pct}");
            prev = s;
        }
    }

    #[test]
    fn drizzle_discount() {
        // 1.5 mm/day halves the effective probability (factor 0.55).
        assert!(score_rain_smart(40.0, Some(1.5)) > score_rain(40.0));
        // Serious rain gets no discount.
        assert_eq!(score_rain_smart(40.0, Some(8.0)), score_rain(40.0));
        assert_eq!(score_rain_smart(40.0, None), score_rain(40.0));
    }

    #[test]
    fn temp_score_band_shape() {
        let band = (16.0, 28.0);
        assert_eq!(score_temp(Some(22.0), band), 100.0);
        assert_eq!(score_temp(Some(16.0), band), 80.0);
        assert_eq!(score_temp(Some(28.0), band), 80.0);
        // Cold is penalized four times harder than heat.
        assert_eq!(score_temp(Some(11.0), band), 40.0);
        assert_eq!(score_temp(Some(33.0), band), 70.0);
        assert_eq!(score_temp(None, band), 50.0);
        // Far below the band the score floors at zero.
        assert_eq!(score_temp(Some(-20.0), band), 0.0);
    }

    #[test]
    fn ski_band_midpoint() {
        let band = Activity::Ski.comfort_band();
        assert_eq!(score_temp(Some(-3.0), band), 100.0);
        assert_eq!(score_temp(Some(2.0), band), 80.0);
    }

    #[test]
    fn ski_band_cold_side_penalized_four_times_harder() {
        let band = Activity::Ski.comfort_band();
        // 2° below the band costs as much as 8° above it.
        assert_eq!(score_temp(Some(-10.0), band), 64.0);
        assert_eq!(score_temp(Some(10.0), band), 64.0);
        // At equal distance from the band, cold loses.
        assert!(score_temp(Some(-10.0), band) < score_temp(Some(4.0), band));
        assert_eq!(score_temp(Some(4.0), band), 76.0);
    }

    #[test]
    fn wind_and_sun_breaks() {
        assert_eq!(score_wind(10.0), 100.0);
        assert_eq!(score_wind(20.0), 70.0);
        assert_eq!(score_wind(40.0), 20.0);
        assert_eq!(score_wind(100.0), 0.0);
        assert_eq!(score_sun(600.0), 100.0);
        assert_eq!(score_sun(300.0), 60.0);
        assert_eq!(score_sun(100.0), 20.0);
        assert_eq!(score_sun(0.0), 0.0);
    }

    #[test]
    fn humidity_only_bites_when_hot_and_damp() {
        assert_eq!(humidity_malus(Some(90.0), Some(20.0)), 0.0);
        assert_eq!(humidity_malus(Some(60.0), Some(30.0)), 0.0);
        assert_eq!(humidity_malus(Some(95.0), Some(38.0)), 20.0);
        assert!(humidity_malus(Some(80.0), Some(30.0)) > 0.0);
        assert_eq!(beach_humidity_malus(Some(95.0), Some(38.0)), 15.0);
        assert_eq!(beach_humidity_malus(Some(80.0), Some(25.0)), 0.0);
    }

    fn hour(temp: f64, rain: f64, sol: f64) -> HourRow {
        HourRow {
            temp: Some(temp),
            temp_p50: Some(temp),
            rain,
            sol,
            wind: Some(8.0),
            humidity: Some(50.0),
            ..HourRow::empty(12)
        }
    }

    #[test]
    fn sunny_summer_day_scores_high() {
        let rows: Vec<HourRow> = (0..24).map(|_| hour(24.0, 5.0, 650.0)).collect();
        let score = score_day(&rows, Activity::General);
        assert!(score.total >= 90, "got {}", score.total);
    }

    #[test]
    fn composite_clamped_under_adversarial_inputs() {
        let awful: Vec<HourRow> = (0..24).map(|_| hour(45.0, 100.0, 0.0)).collect();
        let s = score_day(&awful, Activity::Beach);
        assert!(s.total <= 100);
        let freezing: Vec<HourRow> = (0..24)
            .map(|_| HourRow { humidity: Some(99.0), ..hour(-30.0, 100.0, 0.0) })
            .collect();
        assert!(score_day(&freezing, Activity::General).total <= 100);
        // u8 output means the floor is structural, but the rounding path
        // must not panic either.
        let _ = score_day(&freezing, Activity::Ski);
    }

    #[test]
    fn ski_day_prefers_cold_snowy_weather() {
        let cold_snow: Vec<HourRow> = (0..24)
            .map(|_| HourRow { mm: 0.3, snow: 0.4, ..hour(-3.0, 40.0, 400.0) })
            .collect();
        let warm_rain: Vec<HourRow> = (0..24)
            .map(|_| HourRow { mm: 0.3, ..hour(8.0, 40.0, 400.0) })
            .collect();
        assert!(
            score_day(&cold_snow, Activity::Ski).total
                > score_day(&warm_rain, Activity::Ski).total
        );
    }

    #[test]
    fn month_general_uses_reference_score() {
        let mut m = MonthSummary::empty(7);
        m.fiche_score = Some(88);
        assert_eq!(score_month(&m, Activity::General), 88);
        m.fiche_score = None;
        assert_eq!(score_month(&m, Activity::General), 50);
    }

    #[test]
    fn month_beach_peaks_in_hot_sunny_months() {
        let mut hot = MonthSummary::empty(8);
        hot.tmax = Some(30.0);
        hot.rain_pct = 10.0;
        hot.sun_hours = Some(11.0);
        let mut cool = MonthSummary::empty(4);
        cool.tmax = Some(19.0);
        cool.rain_pct = 40.0;
        cool.sun_hours = Some(6.0);
        assert!(score_month(&hot, Activity::Beach) > score_month(&cool, Activity::Beach));
        assert!(score_month(&hot, Activity::Beach) >= 85);
    }

    #[test]
    fn month_ski_melt_penalty() {
        let mut alpine = MonthSummary::empty(1);
        alpine.tmax = Some(-1.0);
        alpine.tmin = Some(-8.0);
        alpine.rain_pct = 30.0;
        alpine.precip_mm = 3.0;
        alpine.sun_hours = Some(5.0);
        let mut thaw = MonthSummary::empty(4);
        thaw.tmax = Some(12.0);
        thaw.tmin = Some(2.0);
        thaw.rain_pct = 30.0;
        thaw.precip_mm = 3.0;
        thaw.sun_hours = Some(5.0);
        assert!(score_month(&alpine, Activity::Ski) > score_month(&thaw, Activity::Ski));
    }

    #[test]
    fn day_and_month_sun_agree_through_conversion() {
        // 450 W/m² peak equals 9 h of sun: both sides of the /50 bridge land on
        // the same ski sun sub-score.
        assert_eq!(sun_hours_score(450.0 / 50.0), sun_hours_score(9.0));
    }
}
