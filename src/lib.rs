//! Travel-weather climatology and activity comfort scoring.
//!
//! Given a destination and a date (or a whole year), the engine combines
//! Open-Meteo archive data, seasonal-ensemble forecasts and a curated
//! reference catalog into activity-specific comfort scores.

pub mod activity;
pub mod calibrate;
pub mod climatology;
pub mod data;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod location;
pub mod monthly;
pub mod reference;
pub mod score;
pub mod seasonal;
pub mod sky;
pub mod stats;
pub mod table;

pub use activity::Activity;
pub use engine::{AnnualReport, DayReport, Engine};
pub use error::EngineError;
pub use fetch::ApiConfig;
