//! Open-Meteo API client.
//!
//! All endpoints share the same payload shape: a `time` array plus parallel
//! numeric arrays per variable. Variables the server did not return are
//! probed by presence, never assumed; `null` entries mean a missing sample
//! at that timestamp and are carried as `None`, not zero.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::Coord;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed")]
    Transport(#[from] reqwest::Error),
    /// Non-2xx response; `reason` is the API's own explanation when the
    /// error body carried one.
    #[error("API error {status}{}", .reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default())]
    Api { status: u16, reason: Option<String> },
    #[error("malformed payload: {0}")]
    Payload(String),
}

impl FetchError {
    /// Collapse into the engine-level "no data" error, preserving the
    /// API's own reason when the error body carried one.
    pub fn into_engine(self) -> crate::error::EngineError {
        match self {
            FetchError::Api { reason, .. } => crate::error::EngineError::DataUnavailable { reason },
            other => crate::error::EngineError::DataUnavailable { reason: Some(other.to_string()) },
        }
    }

    /// True when the API rejected the request because of the
    /// `sunshine_duration` variable. Some archive deployments don't serve
    /// it; the caller retries without it.
    pub fn is_sunshine_rejection(&self) -> bool {
        matches!(self, FetchError::Api { reason: Some(r), .. } if r.contains("sunshine"))
    }
}

/// Endpoint base URLs. Overridable so tests and alternate deployments can
/// redirect individual services.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub forecast_base: String,
    pub archive_base: String,
    pub seasonal_base: String,
    pub geocoding_base: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            forecast_base: "https://api.open-meteo.com".into(),
            archive_base: "https://archive-api.open-meteo.com".into(),
            seasonal_base: "https://seasonal-api.open-meteo.com".into(),
            geocoding_base: "https://geocoding-api.open-meteo.com".into(),
        }
    }
}

/// Open-Meteo client. Holds one `reqwest::Client` reused across requests.
#[derive(Debug, Clone)]
pub struct OpenMeteo {
    client: reqwest::Client,
    config: ApiConfig,
}

/// Raw parallel-array block (`hourly` or `daily`), with every variable
/// behind a presence check.
#[derive(Debug, Deserialize)]
struct SeriesData {
    time: Vec<String>,
    #[serde(flatten)]
    data: HashMap<String, Vec<serde_json::Value>>,
}

impl SeriesData {
    /// Remove `key` from data and deserialize its JSON array into
    /// `Vec<Option<T>>`. Missing key or wrong shape degrades to empty.
    fn take_field_array<T: DeserializeOwned>(&mut self, key: &str) -> Vec<Option<T>> {
        self.data
            .remove(key)
            .and_then(|v| serde_json::from_value(serde_json::Value::Array(v)).ok())
            .unwrap_or_default()
    }

    /// Drain every array whose key starts with `prefix`, in sorted key
    /// order. Ensemble products expose one series per perturbed member.
    fn take_member_arrays(&mut self, prefix: &str) -> Vec<Vec<Option<f64>>> {
        let mut keys: Vec<String> = self
            .data
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        keys.iter().map(|k| self.take_field_array(k)).collect()
    }
}

fn parse_hourly_times(raw: &[String]) -> Result<Vec<NaiveDateTime>, FetchError> {
    raw.iter()
        .map(|t| {
            NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M")
                .map_err(|e| FetchError::Payload(format!("bad timestamp {t:?}: {e}")))
        })
        .collect()
}

fn parse_daily_times(raw: &[String]) -> Result<Vec<NaiveDate>, FetchError> {
    raw.iter()
        .map(|t| {
            NaiveDate::parse_from_str(t, "%Y-%m-%d")
                .map_err(|e| FetchError::Payload(format!("bad date {t:?}: {e}")))
        })
        .collect()
}

/// Hourly archive window (one year of the climatology sample).
#[derive(Debug)]
pub struct HourlyArchive {
    pub times: Vec<NaiveDateTime>,
    pub temperature: Vec<Option<f64>>,
    pub precipitation: Vec<Option<f64>>,
    pub snowfall: Vec<Option<f64>>,
    pub wind_speed: Vec<Option<f64>>,
    pub radiation: Vec<Option<f64>>,
    pub humidity: Vec<Option<f64>>,
    pub utc_offset_seconds: i32,
    pub timezone: Option<chrono_tz::Tz>,
}

/// Decade of daily archive data for the monthly aggregator.
#[derive(Debug)]
pub struct DailyArchive {
    pub times: Vec<NaiveDate>,
    pub tmax: Vec<Option<f64>>,
    pub tmin: Vec<Option<f64>>,
    pub precip_sum: Vec<Option<f64>>,
    pub radiation_sum: Vec<Option<f64>>,
    pub sunshine: Vec<Option<f64>>,
    pub utc_offset_seconds: i32,
}

/// 8-day hourly forecast for the live horizon.
#[derive(Debug)]
pub struct HourlyForecast {
    pub times: Vec<NaiveDateTime>,
    pub temperature: Vec<Option<f64>>,
    pub rain_probability: Vec<Option<f64>>,
    pub precipitation: Vec<Option<f64>>,
    pub snowfall: Vec<Option<f64>>,
    pub wind_speed: Vec<Option<f64>>,
    pub radiation: Vec<Option<f64>>,
    pub utc_offset_seconds: i32,
    pub timezone: Option<chrono_tz::Tz>,
}

/// Raw seasonal-ensemble daily series: the provider exposes one array per
/// member (`temperature_2m_mean_member01`, ...) next to the base mean.
#[derive(Debug, Default)]
pub struct EnsembleDaily {
    pub times: Vec<NaiveDate>,
    pub temp_mean: Vec<Option<f64>>,
    pub precip_sum: Vec<Option<f64>>,
    pub temp_members: Vec<Vec<Option<f64>>>,
    pub precip_members: Vec<Vec<Option<f64>>>,
    pub wind_members: Vec<Vec<Option<f64>>>,
}

/// One geocoding candidate.
#[derive(Debug, Clone, Deserialize)]
pub struct GeoPlace {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub admin1: Option<String>,
}

impl OpenMeteo {
    pub fn new(config: ApiConfig) -> Self {
        OpenMeteo { client: reqwest::Client::new(), config }
    }

    /// Turn a non-2xx response into `FetchError::Api`, salvaging the
    /// `reason` field from the error body when present.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, FetchError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        #[derive(Deserialize)]
        struct ErrBody {
            reason: Option<String>,
        }
        let reason = response.json::<ErrBody>().await.ok().and_then(|b| b.reason);
        Err(FetchError::Api { status: status.as_u16(), reason })
    }

    /// Fetch the hourly archive for `[start, end]` (one ±10-day window of a
    /// sampled year).
    pub async fn archive_hourly(
        &self,
        coord: Coord,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HourlyArchive, FetchError> {
        #[derive(Debug, Deserialize)]
        struct Response {
            #[serde(default)]
            utc_offset_seconds: i32,
            timezone: Option<chrono_tz::Tz>,
            hourly: SeriesData,
        }

        #[derive(Serialize)]
        struct Query<'a> {
            latitude: f64,
            longitude: f64,
            start_date: String,
            end_date: String,
            hourly: &'a str,
            timezone: &'a str,
        }

        let response = self
            .client
            .get(format!("{}/v1/archive", self.config.archive_base))
            .query(&Query {
                latitude: coord.latitude,
                longitude: coord.longitude,
                start_date: start.format("%Y-%m-%d").to_string(),
                end_date: end.format("%Y-%m-%d").to_string(),
                hourly: "temperature_2m,precipitation,snowfall,windspeed_10m,\
                         shortwave_radiation,relative_humidity_2m",
                timezone: "auto",
            })
            .send()
            .await?;

        let mut data: Response = Self::check(response).await?.json().await?;
        let times = parse_hourly_times(&data.hourly.time)?;

        Ok(HourlyArchive {
            times,
            temperature: data.hourly.take_field_array("temperature_2m"),
            precipitation: data.hourly.take_field_array("precipitation"),
            snowfall: data.hourly.take_field_array("snowfall"),
            wind_speed: data.hourly.take_field_array("windspeed_10m"),
            radiation: data.hourly.take_field_array("shortwave_radiation"),
            humidity: data.hourly.take_field_array("relative_humidity_2m"),
            utc_offset_seconds: data.utc_offset_seconds,
            timezone: data.timezone,
        })
    }

    /// Fetch daily archive data for `[start, end]`. When `with_sunshine` is
    /// false the `sunshine_duration` variable is left out of the request
    /// (retry path for deployments that reject it).
    pub async fn archive_daily(
        &self,
        coord: Coord,
        start: NaiveDate,
        end: NaiveDate,
        with_sunshine: bool,
    ) -> Result<DailyArchive, FetchError> {
        #[derive(Debug, Deserialize)]
        struct Response {
            #[serde(default)]
            utc_offset_seconds: i32,
            daily: SeriesData,
        }

        #[derive(Serialize)]
        struct Query<'a> {
            latitude: f64,
            longitude: f64,
            start_date: String,
            end_date: String,
            daily: &'a str,
            timezone: &'a str,
        }

        let daily = if with_sunshine {
            "temperature_2m_max,temperature_2m_min,precipitation_sum,\
             shortwave_radiation_sum,sunshine_duration"
        } else {
            "temperature_2m_max,temperature_2m_min,precipitation_sum,shortwave_radiation_sum"
        };

        let response = self
            .client
            .get(format!("{}/v1/archive", self.config.archive_base))
            .query(&Query {
                latitude: coord.latitude,
                longitude: coord.longitude,
                start_date: start.format("%Y-%m-%d").to_string(),
                end_date: end.format("%Y-%m-%d").to_string(),
                daily,
                timezone: "auto",
            })
            .send()
            .await?;

        let mut data: Response = Self::check(response).await?.json().await?;
        let times = parse_daily_times(&data.daily.time)?;

        Ok(DailyArchive {
            times,
            tmax: data.daily.take_field_array("temperature_2m_max"),
            tmin: data.daily.take_field_array("temperature_2m_min"),
            precip_sum: data.daily.take_field_array("precipitation_sum"),
            radiation_sum: data.daily.take_field_array("shortwave_radiation_sum"),
            sunshine: data.daily.take_field_array("sunshine_duration"),
            utc_offset_seconds: data.utc_offset_seconds,
        })
    }

    /// Fetch the 8-day hourly forecast for the live horizon.
    pub async fn forecast_hourly(&self, coord: Coord) -> Result<HourlyForecast, FetchError> {
        #[derive(Debug, Deserialize)]
        struct Response {
            #[serde(default)]
            utc_offset_seconds: i32,
            timezone: Option<chrono_tz::Tz>,
            hourly: SeriesData,
        }

        #[derive(Serialize)]
        struct Query<'a> {
            latitude: f64,
            longitude: f64,
            hourly: &'a str,
            forecast_days: u8,
            timezone: &'a str,
        }

        let response = self
            .client
            .get(format!("{}/v1/forecast", self.config.forecast_base))
            .query(&Query {
                latitude: coord.latitude,
                longitude: coord.longitude,
                hourly: "temperature_2m,precipitation_probability,precipitation,snowfall,\
                         windspeed_10m,shortwave_radiation",
                forecast_days: 8,
                timezone: "auto",
            })
            .send()
            .await?;

        let mut data: Response = Self::check(response).await?.json().await?;
        let times = parse_hourly_times(&data.hourly.time)?;

        Ok(HourlyForecast {
            times,
            temperature: data.hourly.take_field_array("temperature_2m"),
            rain_probability: data.hourly.take_field_array("precipitation_probability"),
            precipitation: data.hourly.take_field_array("precipitation"),
            snowfall: data.hourly.take_field_array("snowfall"),
            wind_speed: data.hourly.take_field_array("windspeed_10m"),
            radiation: data.hourly.take_field_array("shortwave_radiation"),
            utc_offset_seconds: data.utc_offset_seconds,
            timezone: data.timezone,
        })
    }

    /// Fetch the seasonal ensemble for `[start, end]`. `with_wind` adds the
    /// wind member series (used by the single-date correction only).
    pub async fn seasonal_daily(
        &self,
        coord: Coord,
        start: NaiveDate,
        end: NaiveDate,
        with_wind: bool,
    ) -> Result<EnsembleDaily, FetchError> {
        #[derive(Debug, Deserialize)]
        struct Response {
            daily: SeriesData,
        }

        #[derive(Serialize)]
        struct Query<'a> {
            latitude: f64,
            longitude: f64,
            daily: &'a str,
            start_date: String,
            end_date: String,
        }

        let daily = if with_wind {
            "temperature_2m_mean,precipitation_sum,windspeed_10m_mean"
        } else {
            "temperature_2m_mean,precipitation_sum"
        };

        let response = self
            .client
            .get(format!("{}/v1/seasonal", self.config.seasonal_base))
            .query(&Query {
                latitude: coord.latitude,
                longitude: coord.longitude,
                daily,
                start_date: start.format("%Y-%m-%d").to_string(),
                end_date: end.format("%Y-%m-%d").to_string(),
            })
            .send()
            .await?;

        let mut data: Response = Self::check(response).await?.json().await?;
        let times = parse_daily_times(&data.daily.time)?;

        let temp_members = data.daily.take_member_arrays("temperature_2m_mean_member");
        let precip_members = data.daily.take_member_arrays("precipitation_sum_member");
        let wind_members = data.daily.take_member_arrays("windspeed_10m_mean_member");

        Ok(EnsembleDaily {
            times,
            temp_mean: data.daily.take_field_array("temperature_2m_mean"),
            precip_sum: data.daily.take_field_array("precipitation_sum"),
            temp_members,
            precip_members,
            wind_members,
        })
    }

    /// Search the geocoding API for a place name.
    pub async fn geocode(&self, name: &str) -> Result<Vec<GeoPlace>, FetchError> {
        #[derive(Debug, Deserialize)]
        struct Response {
            #[serde(default)]
            results: Vec<GeoPlace>,
        }

        #[derive(Serialize)]
        struct Query<'a> {
            name: &'a str,
            count: u8,
            language: &'a str,
        }

        let response = self
            .client
            .get(format!("{}/v1/search", self.config.geocoding_base))
            .query(&Query { name, count: 5, language: "en" })
            .send()
            .await?;

        let data: Response = Self::check(response).await?.json().await?;
        Ok(data.results)
    }
}
