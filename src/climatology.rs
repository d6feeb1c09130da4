//! Hourly climatology built from a decade of archive data.
//!
//! For a target date we sample the same calendar window (±10 days) across
//! the last ten complete years and bucket every hourly observation by
//! hour-of-day. Percentiles over each bucket give the climate profile; a
//! small warming trend is added for dates far in the future.

use chrono::{Datelike, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::data::{Coord, HourRow};
use crate::error::EngineError;
use crate::fetch::OpenMeteo;
use crate::stats::{mean, percentile, round1};

/// Observed warming applied per year of lead time (°C).
const WARMING_PER_YEAR: f64 = 0.03;

/// Number of sampled years.
const SAMPLE_YEARS: i32 = 10;

/// Raw observations for one hour of the day, pooled across years.
#[derive(Debug, Default)]
struct HourBucket {
    temp: Vec<f64>,
    precip: Vec<f64>,
    wind: Vec<f64>,
    sol: Vec<f64>,
    snow: Vec<f64>,
    humidity: Vec<f64>,
}

/// The hourly climate profile plus response metadata for rendering.
#[derive(Debug, Clone)]
pub struct ClimateProfile {
    pub rows: Vec<HourRow>,
    /// UTC offset of the first archive response, when any fetch succeeded.
    pub utc_offset_seconds: Option<i32>,
    pub timezone: Option<chrono_tz::Tz>,
}

/// Build the 24-row hourly climate profile for `target` at `coord`.
///
/// Each sampled year is fetched on its own; a failed year contributes
/// nothing. The build fails only when no samples arrive at all, whether
/// because every fetch failed or because the payloads were empty.
pub async fn build_climatology(
    api: &OpenMeteo,
    coord: Coord,
    target: NaiveDate,
    today: NaiveDate,
) -> Result<ClimateProfile, EngineError> {
    let lead_days = (target - today).num_days().max(0) as f64;
    let trend = lead_days / 365.25 * WARMING_PER_YEAR;

    let end_year = today.year() - 1;
    let mut buckets: Vec<HourBucket> = (0..24).map(|_| HourBucket::default()).collect();
    let mut meta: Option<(i32, Option<chrono_tz::Tz>)> = None;
    let mut last_reason = None;

    for year in (end_year - SAMPLE_YEARS + 1)..=end_year {
        let sample = same_day_of_year(target, year);
        let start = sample - chrono::Duration::days(10);
        let end = sample + chrono::Duration::days(10);
        match api.archive_hourly(coord, start, end).await {
            Ok(archive) => {
                if meta.is_none() {
                    meta = Some((archive.utc_offset_seconds, archive.timezone));
                }
                for (i, ts) in archive.times.iter().enumerate() {
                    let b = &mut buckets[chrono::Timelike::hour(ts) as usize];
                    let push = |dst: &mut Vec<f64>, src: &[Option<f64>]| {
                        if let Some(v) = src.get(i).copied().flatten() {
                            dst.push(v);
                        }
                    };
                    push(&mut b.temp, &archive.temperature);
                    push(&mut b.precip, &archive.precipitation);
                    push(&mut b.wind, &archive.wind_speed);
                    push(&mut b.sol, &archive.radiation);
                    push(&mut b.snow, &archive.snowfall);
                    push(&mut b.humidity, &archive.humidity);
                }
                info!(year, "sampled archive year");
            }
            Err(e) => {
                debug!(year, error = %e, "archive year unavailable, skipping");
                if let crate::fetch::FetchError::Api { reason, .. } = e {
                    last_reason = reason;
                }
            }
        }
    }

    finish(buckets, meta, last_reason, trend)
}

/// Reduce the pooled buckets to a profile. A successful fetch whose
/// payload contributed no samples is as empty-handed as a failed one.
fn finish(
    buckets: Vec<HourBucket>,
    meta: Option<(i32, Option<chrono_tz::Tz>)>,
    last_reason: Option<String>,
    trend: f64,
) -> Result<ClimateProfile, EngineError> {
    let samples: usize = buckets
        .iter()
        .map(|b| b.temp.len() + b.precip.len() + b.sol.len())
        .sum();
    let (utc_offset_seconds, timezone) = match meta {
        Some((offset, tz)) if samples > 0 => (Some(offset), tz),
        _ => return Err(EngineError::DataUnavailable { reason: last_reason }),
    };
    Ok(ClimateProfile { rows: build_rows(&buckets, trend), utc_offset_seconds, timezone })
}

/// Move `date` to `year`, mapping Feb 29 to Feb 28 in common years.
fn same_day_of_year(date: NaiveDate, year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, 2, 28).unwrap_or(date))
}

fn build_rows(buckets: &[HourBucket], trend: f64) -> Vec<HourRow> {
    buckets
        .iter()
        .enumerate()
        .map(|(h, b)| {
            let wet = b.precip.iter().filter(|&&p| p > 0.1).count();
            let trended = |p: Option<f64>| p.map(|v| round1(v + trend));
            let temp_p50 = trended(percentile(&b.temp, 50.0));
            let temp_freq = temp_p50.filter(|_| !b.temp.is_empty()).map(|p50| {
                let in_range = b.temp.iter().filter(|&&t| (t - p50).abs() <= 2.0).count();
                (in_range as f64 / b.temp.len() as f64 * 100.0).round() as u8
            });
            let sol = |p: f64| percentile(&b.sol, p).unwrap_or(0.0).max(0.0);
            HourRow {
                hour: h as u8,
                temp_p25: trended(percentile(&b.temp, 25.0)),
                temp_p50,
                temp_p75: trended(percentile(&b.temp, 75.0)),
                temp: temp_p50,
                rain: if b.precip.is_empty() {
                    0.0
                } else {
                    (wet as f64 / b.precip.len() as f64 * 100.0).round()
                },
                mm: mean(&b.precip).unwrap_or(0.0),
                snow: mean(&b.snow).unwrap_or(0.0),
                wind: percentile(&b.wind, 50.0),
                sol_p25: sol(25.0),
                sol_p50: sol(50.0),
                sol_p75: sol(75.0),
                sol: sol(50.0),
                temp_freq,
                humidity: mean(&b.humidity),
                is_forecast: false,
            }
        })
        .collect()
}

/// The three day scenarios derived from one climate profile.
#[derive(Debug, Clone)]
pub struct ScenarioSet {
    pub main: Vec<HourRow>,
    pub pessimistic: Vec<HourRow>,
    pub optimistic: Vec<HourRow>,
}

/// Deterministic seed from place and date, so repeated queries for the
/// same trip produce identical scenarios.
pub fn make_seed(coord: Coord, date: NaiveDate) -> u64 {
    let lat = (coord.latitude * 1000.0).round();
    let lon = (coord.longitude * 1000.0).round();
    let v = lat * 100_000.0
        + lon * 100.0
        + f64::from(date.year()) * 10_000.0
        + f64::from(date.month()) * 100.0
        + f64::from(date.day());
    v.abs() as u64
}

/// Derive main / pessimistic / optimistic scenarios from the climate rows.
///
/// The pessimistic and optimistic branches jitter the p25/p75 temperatures
/// with a seeded RNG; rows with no temperature data consume no randomness.
pub fn build_scenarios(rows: &[HourRow], coord: Coord, date: NaiveDate) -> ScenarioSet {
    let mut rng = ChaCha8Rng::seed_from_u64(make_seed(coord, date));

    let main = rows
        .iter()
        .map(|r| HourRow { temp: r.temp_p50, sol: r.sol_p50, ..r.clone() })
        .collect();

    let pessimistic = rows
        .iter()
        .map(|r| HourRow {
            temp: match r.temp_p25 {
                Some(p25) => Some(round1(p25 - rng.gen::<f64>())),
                None => r.temp_p50,
            },
            sol: (r.sol_p25 * 0.4).max(0.0),
            rain: (r.rain * 1.5 + 10.0).round().min(100.0),
            ..r.clone()
        })
        .collect();

    let optimistic = rows
        .iter()
        .map(|r| HourRow {
            temp: match r.temp_p75 {
                Some(p75) => Some(round1(p75 + rng.gen::<f64>())),
                None => r.temp_p50,
            },
            sol: (r.sol_p75 * 1.4).min(900.0),
            rain: (r.rain * 0.35).round().max(0.0),
            ..r.clone()
        })
        .collect();

    ScenarioSet { main, pessimistic, optimistic }
}
