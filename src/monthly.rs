//! Monthly climate summaries from a decade of daily archive data.

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info};

use crate::data::{Coord, MonthSummary};
use crate::error::EngineError;
use crate::fetch::{DailyArchive, OpenMeteo};
use crate::stats::{median, round1};

/// Sunshine is capped at this many hours per day.
const MAX_SUN_HOURS: f64 = 14.0;

/// Twelve month summaries plus response metadata for rendering.
#[derive(Debug, Clone)]
pub struct MonthlyClimate {
    pub months: Vec<MonthSummary>,
    pub utc_offset_seconds: i32,
}

impl MonthlyClimate {
    fn from_archive(archive: &DailyArchive) -> Self {
        MonthlyClimate {
            months: aggregate_by_month(archive),
            utc_offset_seconds: archive.utc_offset_seconds,
        }
    }
}

/// Fetch ten years of daily data and aggregate per calendar month.
///
/// Some archive deployments reject the `sunshine_duration` variable; in
/// that case the request is retried without it and sunshine hours are
/// estimated from the radiation sum instead.
pub async fn build_monthly(
    api: &OpenMeteo,
    coord: Coord,
    today: NaiveDate,
) -> Result<MonthlyClimate, EngineError> {
    let end_year = today.year() - 1;
    let start = match NaiveDate::from_ymd_opt(end_year - 9, 1, 1) {
        Some(d) => d,
        None => return Err(EngineError::DataUnavailable { reason: None }),
    };
    let end = match NaiveDate::from_ymd_opt(end_year, 12, 31) {
        Some(d) => d,
        None => return Err(EngineError::DataUnavailable { reason: None }),
    };

    let archive = match api.archive_daily(coord, start, end, true).await {
        Ok(a) => a,
        Err(e) if e.is_sunshine_rejection() => {
            debug!(error = %e, "retrying decade archive without sunshine duration");
            api.archive_daily(coord, start, end, false)
                .await
                .map_err(|e| e.into_engine())?
        }
        Err(e) => return Err(e.into_engine()),
    };

    if archive.times.is_empty() {
        return Err(EngineError::DataUnavailable { reason: None });
    }
    info!(days = archive.times.len(), "aggregating decade archive");
    Ok(MonthlyClimate::from_archive(&archive))
}

/// One bucket of daily values per calendar month.
#[derive(Debug, Default)]
struct MonthBucket {
    tmax: Vec<f64>,
    tmin: Vec<f64>,
    precip: Vec<f64>,
    radiation: Vec<f64>,
    sunshine: Vec<f64>,
}

pub fn aggregate_by_month(archive: &DailyArchive) -> Vec<MonthSummary> {
    let mut buckets: Vec<MonthBucket> = (0..12).map(|_| MonthBucket::default()).collect();
    for (i, day) in archive.times.iter().enumerate() {
        let b = &mut buckets[day.month0() as usize];
        let push = |dst: &mut Vec<f64>, src: &[Option<f64>]| {
            if let Some(v) = src.get(i).copied().flatten() {
                dst.push(v);
            }
        };
        push(&mut b.tmax, &archive.tmax);
        push(&mut b.tmin, &archive.tmin);
        push(&mut b.precip, &archive.precip_sum);
        push(&mut b.radiation, &archive.radiation_sum);
        push(&mut b.sunshine, &archive.sunshine);
    }

    buckets
        .iter()
        .enumerate()
        .map(|(idx, b)| {
            let tmax = median(&b.tmax);
            let tmin = median(&b.tmin);
            let avg_temp = match (tmax, tmin) {
                (Some(hi), Some(lo)) => Some((hi + lo) / 2.0),
                _ => None,
            };
            let rain_days = b.precip.iter().filter(|&&v| v > 1.0).count();
            let rain_pct = if b.precip.is_empty() {
                0.0
            } else {
                (rain_days as f64 / b.precip.len() as f64 * 100.0).round()
            };
            let radiation = median(&b.radiation);
            // sunshine_duration is in seconds per day; when absent, the
            // radiation sum (MJ/m²) approximates sun hours at /3.6. No
            // samples for either means the value is genuinely unknown.
            let sun_hours = match median(&b.sunshine) {
                Some(sec) => Some((sec / 3600.0).min(MAX_SUN_HOURS)),
                None => radiation.map(|r| (r / 3.6).min(MAX_SUN_HOURS)),
            };
            let precip_mm = if b.precip.is_empty() {
                0.0
            } else {
                round1(median(&b.precip).unwrap_or(0.0))
            };
            MonthSummary {
                tmax,
                tmin,
                avg_temp,
                rain_pct,
                sun_hours,
                radiation: radiation.unwrap_or(0.0),
                precip_mm,
                ..MonthSummary::empty(idx as u8 + 1)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn archive(times: Vec<NaiveDate>) -> DailyArchive {
        let n = times.len();
        DailyArchive {
            times,
            tmax: vec![None; n],
            tmin: vec![None; n],
            precip_sum: vec![None; n],
            radiation_sum: vec![None; n],
            sunshine: vec![None; n],
            utc_offset_seconds: 0,
        }
    }

    #[test]
    fn always_twelve_months() {
        let summaries = aggregate_by_month(&archive(vec![day(2025, 6, 1)]));
        assert_eq!(summaries.len(), 12);
        assert_eq!(summaries[0].month, 1);
        assert_eq!(summaries[11].month, 12);
        // Months with no samples stay null without panicking.
        assert_eq!(summaries[0].tmax, None);
        assert_eq!(summaries[0].rain_pct, 0.0);
        assert_eq!(summaries[0].sun_hours, None);
    }

    #[test]
    fn climate_carries_archive_offset() {
        let mut a = archive(vec![day(2025, 6, 1)]);
        a.utc_offset_seconds = 7200;
        let climate = MonthlyClimate::from_archive(&a);
        assert_eq!(climate.utc_offset_seconds, 7200);
        assert_eq!(climate.months.len(), 12);
    }

    #[test]
    fn medians_and_rain_days() {
        let mut a = archive(vec![
            day(2024, 7, 1),
            day(2024, 7, 2),
            day(2025, 7, 1),
            day(2025, 7, 2),
        ]);
        a.tmax = vec![Some(28.0), Some(30.0), Some(32.0), Some(26.0)];
        a.tmin = vec![Some(18.0), Some(20.0), Some(22.0), Some(16.0)];
        a.precip_sum = vec![Some(0.0), Some(5.0), Some(0.4), Some(2.0)];
        let july = &aggregate_by_month(&a)[6];
        assert_eq!(july.tmax, Some(29.0));
        assert_eq!(july.tmin, Some(19.0));
        assert_eq!(july.avg_temp, Some(24.0));
        // Two of four days above 1mm.
        assert_eq!(july.rain_pct, 50.0);
        assert_eq!(july.precip_mm, 1.2);
    }

    #[test]
    fn sunshine_capped_and_falls_back_to_radiation() {
        let mut a = archive(vec![day(2025, 1, 5), day(2025, 2, 5)]);
        a.sunshine = vec![Some(60_000.0), None];
        a.radiation_sum = vec![None, Some(18.0)];
        let months = aggregate_by_month(&a);
        // 60000s = 16.7h, capped at 14.
        assert_eq!(months[0].sun_hours, Some(14.0));
        // February has no sunshine samples: 18 MJ / 3.6 = 5h.
        assert_eq!(months[1].sun_hours, Some(5.0));
        // March has neither.
        assert_eq!(months[2].sun_hours, None);
    }

    #[test]
    fn null_entries_are_skipped_not_zeroed() {
        let mut a = archive(vec![day(2025, 3, 1), day(2025, 3, 2)]);
        a.tmax = vec![Some(10.0), None];
        let march = &aggregate_by_month(&a)[2];
        assert_eq!(march.tmax, Some(10.0));
    }
}
