//! Engine error taxonomy.
//!
//! Transient fetch failures (one archive year, the seasonal ensemble) are
//! swallowed where they occur and contribute empty buckets; only the cases
//! below surface to the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Every fetch of an aggregation failed, or the API returned a
    /// structurally empty payload. Carries the upstream reason when the API
    /// supplied one.
    #[error("weather data unavailable for this destination{}", reason_suffix(.reason))]
    DataUnavailable { reason: Option<String> },

    /// Geocoding returned zero results for the query.
    #[error("unknown location: {0}")]
    UnknownLocation(String),

    /// A coordinate pair parsed but fell outside valid ranges.
    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),
}

fn reason_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(r) => format!(" ({r})"),
        None => String::new(),
    }
}
