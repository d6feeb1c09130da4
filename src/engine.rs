//! Pipeline orchestration.
//!
//! The day pipeline picks its data source from the planning horizon: a
//! live forecast within a week, climatology corrected by the seasonal
//! ensemble up to 210 days, pure climatology beyond. The annual pipeline
//! combines the decade aggregation with reference calibration and the
//! seasonal blend.

use chrono::{NaiveDate, Timelike};
use tracing::{debug, info};

use crate::activity::Activity;
use crate::calibrate::anchor_scores;
use crate::climatology::{build_climatology, build_scenarios, ScenarioSet};
use crate::data::{Coord, Horizon, HourRow, MonthSummary};
use crate::error::EngineError;
use crate::fetch::{ApiConfig, HourlyForecast, OpenMeteo};
use crate::location::{resolve_location, Location};
use crate::monthly::build_monthly;
use crate::reference::ReferenceTable;
use crate::score::{self, DayAggregates, ScoreBreakdown};
use crate::seasonal;

pub struct Engine {
    api: OpenMeteo,
    reference: &'static ReferenceTable,
}

/// One scenario with its aggregates and activity score.
#[derive(Debug, Clone)]
pub struct ScoredScenario {
    pub rows: Vec<HourRow>,
    pub aggregates: DayAggregates,
    pub score: ScoreBreakdown,
}

#[derive(Debug, Clone)]
pub struct DayReport {
    pub horizon: Horizon,
    pub main: ScoredScenario,
    pub pessimistic: ScoredScenario,
    pub optimistic: ScoredScenario,
    /// True when the single-date seasonal correction was applied.
    pub seasonal_corrected: bool,
    /// UTC offset reported by the data source, for local-time rendering.
    pub utc_offset_seconds: Option<i32>,
    pub timezone: Option<chrono_tz::Tz>,
}

#[derive(Debug, Clone)]
pub struct AnnualReport {
    pub months: Vec<MonthSummary>,
    /// Catalog destination the scores were calibrated against, if any.
    pub reference_name: Option<String>,
    /// UTC offset reported by the archive, for local-time rendering.
    pub utc_offset_seconds: i32,
}

impl AnnualReport {
    /// Months with their activity scores, best first.
    pub fn ranked(&self, activity: Activity) -> Vec<(&MonthSummary, u8)> {
        let mut scored: Vec<(&MonthSummary, u8)> = self
            .months
            .iter()
            .map(|m| (m, score::score_month(m, activity)))
            .collect();
        scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.month.cmp(&b.0.month)));
        scored
    }
}

impl Engine {
    pub fn new(config: ApiConfig) -> Self {
        Engine {
            api: OpenMeteo::new(config),
            reference: ReferenceTable::bundled(),
        }
    }

    /// Resolve a location query (place name or coordinate pair).
    pub async fn resolve(&self, query: &str) -> Result<Location, EngineError> {
        resolve_location(&self.api, query).await
    }

    /// Build the scored day report for `date` at `coord`.
    pub async fn day_report(
        &self,
        coord: Coord,
        date: NaiveDate,
        activity: Activity,
        today: NaiveDate,
    ) -> Result<DayReport, EngineError> {
        let horizon = Horizon::classify(date, today);
        let mut seasonal_corrected = false;

        let (rows, utc_offset_seconds, timezone) = if horizon.is_live() {
            info!(%date, "within forecast range, using live forecast");
            let forecast = self
                .api
                .forecast_hourly(coord)
                .await
                .map_err(|e| e.into_engine())?;
            let rows = forecast_rows(&forecast, date);
            (rows, Some(forecast.utc_offset_seconds), forecast.timezone)
        } else {
            let profile = build_climatology(&self.api, coord, date, today).await?;
            let mut rows = profile.rows;
            if matches!(horizon, Horizon::Seasonal(_)) {
                if let Some(seas) = seasonal::day_outlook(&self.api, coord, date).await {
                    debug!(?seas, "applying single-date seasonal correction");
                    rows = seasonal::correct_day(&rows, &seas);
                    seasonal_corrected = true;
                }
            }
            (rows, profile.utc_offset_seconds, profile.timezone)
        };

        let scenarios = build_scenarios(&rows, coord, date);
        let scored = |rows: Vec<HourRow>| {
            let aggregates = score::day_aggregates(&rows);
            let score = score::score_day(&rows, activity);
            ScoredScenario { rows, aggregates, score }
        };
        let ScenarioSet { main, pessimistic, optimistic } = scenarios;
        Ok(DayReport {
            horizon,
            main: scored(main),
            pessimistic: scored(pessimistic),
            optimistic: scored(optimistic),
            seasonal_corrected,
            utc_offset_seconds,
            timezone,
        })
    }

    /// Build the calibrated annual report for `coord`.
    pub async fn annual_report(
        &self,
        coord: Coord,
        today: NaiveDate,
    ) -> Result<AnnualReport, EngineError> {
        let (monthly, outlook) = tokio::join!(
            build_monthly(&self.api, coord, today),
            seasonal::monthly_outlook(&self.api, coord, today),
        );
        let climate = monthly?;
        let mut months = climate.months;

        // Calibration runs before the seasonal blend: reference scores
        // describe the climatological normal, not this year's anomaly.
        let reference_name = calibrate_months(&mut months, coord, self.reference);
        seasonal::blend_monthly(&mut months, &outlook, today);

        Ok(AnnualReport {
            months,
            reference_name,
            utc_offset_seconds: climate.utc_offset_seconds,
        })
    }
}

/// Inject curated reference scores when the destination is in the catalog,
/// then anchor the remaining months. Returns the catalog name on a hit.
fn calibrate_months(
    months: &mut [MonthSummary],
    coord: Coord,
    reference: &ReferenceTable,
) -> Option<String> {
    let hit = reference.find(coord);
    if let Some(entry) = hit {
        info!(name = %entry.name, "calibrating against catalog destination");
        for (m, &score) in months.iter_mut().zip(entry.scores.iter()) {
            m.fiche_score = Some(score);
        }
    }
    anchor_scores(months, hit.is_some_and(|e| e.monsoon));
    hit.map(|e| e.name.clone())
}

/// Synthesize 24 hourly rows for `date` from the live forecast. Point
/// forecasts carry no spread, so the percentile band collapses onto the
/// forecast value.
fn forecast_rows(forecast: &HourlyForecast, date: NaiveDate) -> Vec<HourRow> {
    (0..24u8)
        .map(|h| {
            let idx = forecast
                .times
                .iter()
                .position(|ts| ts.date() == date && ts.hour() == u32::from(h));
            let get = |series: &[Option<f64>]| idx.and_then(|i| series.get(i).copied().flatten());
            let temp = get(&forecast.temperature).map(crate::stats::round1);
            HourRow {
                hour: h,
                temp_p25: temp,
                temp_p50: temp,
                temp_p75: temp,
                temp,
                rain: get(&forecast.rain_probability).unwrap_or(0.0),
                mm: get(&forecast.precipitation).unwrap_or(0.0),
                snow: get(&forecast.snowfall).unwrap_or(0.0),
                wind: Some(get(&forecast.wind_speed).unwrap_or(0.0)),
                sol_p25: get(&forecast.radiation).unwrap_or(0.0).max(0.0),
                sol_p50: get(&forecast.radiation).unwrap_or(0.0).max(0.0),
                sol_p75: get(&forecast.radiation).unwrap_or(0.0).max(0.0),
                sol: get(&forecast.radiation).unwrap_or(0.0).max(0.0),
                temp_freq: None,
                humidity: None,
                is_forecast: true,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn forecast_for(date: NaiveDate) -> HourlyForecast {
        let times: Vec<NaiveDateTime> = (0..48)
            .map(|i| {
                date.and_hms_opt(0, 0, 0).unwrap() + chrono::Duration::hours(i)
            })
            .collect();
        let n = times.len();
        HourlyForecast {
            times,
            temperature: (0..n).map(|i| Some(10.0 + i as f64 / 10.0)).collect(),
            rain_probability: vec![Some(30.0); n],
            precipitation: vec![Some(0.2); n],
            snowfall: vec![None; n],
            wind_speed: vec![Some(14.0); n],
            radiation: vec![Some(250.0); n],
            utc_offset_seconds: 0,
            timezone: None,
        }
    }

    #[test]
    fn forecast_rows_select_target_date() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let rows = forecast_rows(&forecast_for(date), date);
        assert_eq!(rows.len(), 24);
        assert_eq!(rows[0].temp, Some(10.0));
        assert_eq!(rows[23].temp, Some(12.3));
        assert!(rows.iter().all(|r| r.is_forecast));
        // The band collapses onto the point forecast.
        assert_eq!(rows[5].temp_p25, rows[5].temp_p75);
    }

    #[test]
    fn forecast_rows_for_missing_date_are_empty() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let other = NaiveDate::from_ymd_opt(2026, 9, 15).unwrap();
        let rows = forecast_rows(&forecast_for(date), other);
        assert_eq!(rows.len(), 24);
        assert!(rows.iter().all(|r| r.temp.is_none() && r.rain == 0.0));
    }

    #[test]
    fn catalog_destination_keeps_curated_scores() {
        let mut months: Vec<MonthSummary> = (1..=12)
            .map(|m| MonthSummary {
                tmax: Some(20.0),
                avg_temp: Some(16.0),
                rain_pct: 30.0,
                sun_hours: Some(6.0),
                ..MonthSummary::empty(m)
            })
            .collect();
        let paris = Coord { latitude: 48.8566, longitude: 2.3522 };
        let name = calibrate_months(&mut months, paris, ReferenceTable::bundled());
        assert_eq!(name.as_deref(), Some("Paris"));
        assert_eq!(months[6].fiche_score, Some(100));
    }

    #[test]
    fn unknown_destination_gets_anchored_scores() {
        let mut months: Vec<MonthSummary> = (1..=12)
            .map(|m| MonthSummary {
                tmax: Some(15.0 + f64::from(m)),
                avg_temp: Some(12.0 + f64::from(m)),
                rain_pct: 30.0,
                sun_hours: Some(6.0),
                ..MonthSummary::empty(m)
            })
            .collect();
        let nowhere = Coord { latitude: 47.0, longitude: -19.0 };
        let name = calibrate_months(&mut months, nowhere, ReferenceTable::bundled());
        assert_eq!(name, None);
        assert!(months.iter().all(|m| m.fiche_score.is_some()));
    }

    #[test]
    fn ranked_months_are_sorted_descending() {
        let months: Vec<MonthSummary> = (1..=12)
            .map(|m| MonthSummary {
                fiche_score: Some(u16::from(m) * 8),
                ..MonthSummary::empty(m)
            })
            .collect();
        let report = AnnualReport { months, reference_name: None, utc_offset_seconds: 0 };
        let ranked = report.ranked(Activity::General);
        assert_eq!(ranked[0].0.month, 12);
        assert_eq!(ranked[0].1, 96);
        assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));
    }
}
