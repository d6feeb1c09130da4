//! Seasonal-ensemble corrections.
//!
//! Two separate consumers of the seasonal model: the annual view blends
//! per-month ensemble means into the climatology (7-month window), and the
//! single-date view shifts and rescales a day's temperature band.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::data::{Coord, HourRow, MonthSummary};
use crate::fetch::{EnsembleDaily, OpenMeteo};
use crate::stats::round1;

/// How far the seasonal model reaches (days).
pub const SEASONAL_RANGE_DAYS: i64 = 210;

/// Weight of the seasonal forecast when blended into climatology.
const BLEND_WEIGHT: f64 = 0.4;

/// Per-calendar-month ensemble aggregate, keyed by month number 1-12.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthOutlook {
    /// Mean temperature across all member-days (°C).
    pub t_mean: f64,
    /// Share of member-days with >0.5 mm precipitation, 0-100.
    pub rain_prob: Option<f64>,
}

/// Fetch the 210-day ensemble and aggregate it per calendar month.
///
/// The seasonal model is an enhancement, not a requirement: any failure
/// yields an empty map and the caller proceeds on climatology alone.
pub async fn monthly_outlook(
    api: &OpenMeteo,
    coord: Coord,
    today: NaiveDate,
) -> HashMap<u8, MonthOutlook> {
    let end = today + chrono::Duration::days(SEASONAL_RANGE_DAYS);
    match api.seasonal_daily(coord, today, end, false).await {
        Ok(ensemble) => aggregate_outlook(&ensemble),
        Err(e) => {
            debug!(error = %e, "seasonal ensemble unavailable, skipping blend");
            HashMap::new()
        }
    }
}

fn aggregate_outlook(ensemble: &EnsembleDaily) -> HashMap<u8, MonthOutlook> {
    #[derive(Default)]
    struct Bucket {
        temps: Vec<f64>,
        precips: Vec<f64>,
    }
    let mut buckets: HashMap<u8, Bucket> = HashMap::new();
    for (i, day) in ensemble.times.iter().enumerate() {
        let b = buckets.entry(day.month() as u8).or_default();
        // The base series counts as one more member.
        for series in std::iter::once(&ensemble.temp_mean).chain(&ensemble.temp_members) {
            if let Some(v) = series.get(i).copied().flatten() {
                b.temps.push(v);
            }
        }
        for series in std::iter::once(&ensemble.precip_sum).chain(&ensemble.precip_members) {
            if let Some(v) = series.get(i).copied().flatten() {
                b.precips.push(v);
            }
        }
    }

    buckets
        .into_iter()
        .filter(|(_, b)| !b.temps.is_empty())
        .map(|(month, b)| {
            let t_mean = b.temps.iter().sum::<f64>() / b.temps.len() as f64;
            let rain_prob = if b.precips.is_empty() {
                None
            } else {
                let wet = b.precips.iter().filter(|&&v| v > 0.5).count();
                Some((wet as f64 / b.precips.len() as f64 * 100.0).round())
            };
            (month, MonthOutlook { t_mean, rain_prob })
        })
        .collect()
}

/// Blend the seasonal outlook into the climatological month summaries.
///
/// Only the 7 months starting at the current calendar month are touched
/// (the model's reach). Temperature moves 40% toward the ensemble mean;
/// rain probability is a 60/40 mix. Deltas below the noise thresholds
/// (±0.3 °C, ±3 points) are not reported. `has_seasonal` guards against
/// blending twice.
pub fn blend_monthly(
    monthly: &mut [MonthSummary],
    outlook: &HashMap<u8, MonthOutlook>,
    today: NaiveDate,
) {
    let now_month = today.month0();
    for s in 0..7 {
        let mi = ((now_month + s) % 12) as usize;
        let clim = &mut monthly[mi];
        if clim.has_seasonal {
            continue;
        }
        let (seas, avg) = match (outlook.get(&(mi as u8 + 1)), clim.avg_temp) {
            (Some(o), Some(avg)) => (o, avg),
            _ => continue,
        };

        let delta = seas.t_mean - avg;
        let applied = round1(delta * BLEND_WEIGHT);
        clim.avg_temp = Some(round1(avg + delta * BLEND_WEIGHT));
        clim.tmax = clim.tmax.map(|t| round1(t + delta * BLEND_WEIGHT));
        clim.tmin = clim.tmin.map(|t| round1(t + delta * BLEND_WEIGHT));
        clim.seas_temp_delta = (applied.abs() >= 0.3).then_some(applied);

        if let Some(rain_prob) = seas.rain_prob {
            let old = clim.rain_pct;
            let blended = (old * (1.0 - BLEND_WEIGHT) + rain_prob * BLEND_WEIGHT)
                .round()
                .clamp(0.0, 100.0);
            clim.rain_pct = blended;
            let rain_delta = (blended - old).round() as i32;
            clim.seas_rain_delta = (rain_delta.abs() >= 3).then_some(rain_delta);
        }
        clim.has_seasonal = true;
    }
}

/// Ensemble summary at a single target date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayOutlook {
    pub t_mean: f64,
    pub t_p25: f64,
    pub t_p75: f64,
    /// Share of members with >0.1 mm precipitation, 0-100.
    pub rain_prob: Option<f64>,
    pub wind_mean: Option<f64>,
}

/// Fetch the ensemble members at exactly `date`. `None` when the model
/// has nothing for that date; the day pipeline then stays climatological.
pub async fn day_outlook(api: &OpenMeteo, coord: Coord, date: NaiveDate) -> Option<DayOutlook> {
    let ensemble = match api.seasonal_daily(coord, date, date, true).await {
        Ok(e) => e,
        Err(e) => {
            debug!(error = %e, "single-date ensemble unavailable");
            return None;
        }
    };
    if ensemble.times.first() != Some(&date) {
        return None;
    }

    let at = |series: &[Vec<Option<f64>>]| -> Vec<f64> {
        series.iter().filter_map(|s| s.first().copied().flatten()).collect()
    };
    let mut temps = at(&ensemble.temp_members);
    if temps.is_empty() {
        return None;
    }
    temps.sort_by(|a, b| a.total_cmp(b));
    let n = temps.len();
    let at_q = |q: f64| temps[((n as f64 * q) as usize).min(n - 1)];

    let precips = at(&ensemble.precip_members);
    let rain_prob = if precips.is_empty() {
        None
    } else {
        let wet = precips.iter().filter(|&&v| v > 0.1).count();
        Some((wet as f64 / precips.len() as f64 * 100.0).round())
    };
    let winds = at(&ensemble.wind_members);
    let wind_mean = if winds.is_empty() {
        None
    } else {
        Some(winds.iter().sum::<f64>() / winds.len() as f64)
    };

    Some(DayOutlook {
        t_mean: ensemble
            .temp_mean
            .first()
            .copied()
            .flatten()
            .unwrap_or_else(|| at_q(0.5)),
        t_p25: at_q(0.25),
        t_p75: at_q(0.75),
        rain_prob,
        wind_mean,
    })
}

/// Apply the single-date correction to a day's climate rows.
///
/// The whole temperature band shifts by the ensemble-vs-history offset and
/// its spread is rescaled by the spread ratio (clamped, and only when both
/// spreads are meaningful). Rain and wind move a fraction of their
/// anomalies.
pub fn correct_day(rows: &[HourRow], seas: &DayOutlook) -> Vec<HourRow> {
    let mut hist_sum = 0.0;
    let mut hist_cnt = 0usize;
    let mut rain_sum = 0.0;
    let mut wind_sum = 0.0;
    let mut spread_sum = 0.0;
    let mut spread_cnt = 0usize;
    for r in rows {
        if let Some(p50) = r.temp_p50 {
            hist_sum += p50;
            hist_cnt += 1;
        }
        rain_sum += r.rain;
        wind_sum += r.wind.unwrap_or(0.0);
        if let (Some(p25), Some(p75)) = (r.temp_p25, r.temp_p75) {
            spread_sum += (p75 - p25) / 2.0;
            spread_cnt += 1;
        }
    }
    if hist_cnt == 0 || rows.is_empty() {
        return rows.to_vec();
    }

    let hist_mean = hist_sum / hist_cnt as f64;
    let offset = ((seas.t_mean - hist_mean) * 100.0).round() / 100.0;
    let hist_spread = if spread_cnt > 0 { spread_sum / spread_cnt as f64 } else { 1.0 };
    let seas_spread = (seas.t_p75 - seas.t_p25) / 2.0;
    let ratio = if hist_spread > 0.5 && seas_spread > 0.0 {
        (seas_spread / hist_spread).clamp(0.3, 2.5)
    } else {
        1.0
    };
    let hist_rain_avg = rain_sum / rows.len() as f64;
    let hist_wind_avg = wind_sum / rows.len() as f64;

    rows.iter()
        .map(|r| {
            let new_p50 = r.temp_p50.map(|p| round1(p + offset));
            let half = |limit: Option<f64>| match (r.temp_p50, limit) {
                (Some(p50), Some(l)) => (l - p50).abs(),
                _ => 0.0,
            };
            let (lo_half, hi_half) = (half(r.temp_p25), half(r.temp_p75));
            let rain = match seas.rain_prob {
                Some(prob) => {
                    let anomaly = prob - hist_rain_avg;
                    (r.rain + anomaly * 0.25).round().clamp(0.0, 100.0)
                }
                None => r.rain,
            };
            let wind = match (seas.wind_mean, r.wind) {
                (Some(seas_wind), Some(w)) => {
                    let delta = ((seas_wind - hist_wind_avg) * 0.35).clamp(-5.0, 5.0);
                    Some(round1(w + delta).max(0.0))
                }
                _ => r.wind,
            };
            HourRow {
                temp_p50: new_p50,
                temp_p25: new_p50.map(|p| round1(p - lo_half * ratio)),
                temp_p75: new_p50.map(|p| round1(p + hi_half * ratio)),
                temp: new_p50,
                sol: r.sol_p50,
                rain,
                wind,
                ..r.clone()
            }
        })
        .collect()
}
