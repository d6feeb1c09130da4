//! Activity profiles and their scoring configuration.

use clap::ValueEnum;

/// Relative weights of the composite sub-scores, summing to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreWeights {
    pub rain: u8,
    pub temp: u8,
    pub wind: u8,
    pub sun: u8,
}

/// The supported activity profiles. Each carries its own comfort band and
/// weights; beach and ski additionally use bespoke composite formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Activity {
    General,
    Beach,
    Ski,
}

impl Activity {
    pub const ALL: [Activity; 3] = [Activity::General, Activity::Beach, Activity::Ski];

    /// Comfort temperature band [min, max] in °C.
    pub fn comfort_band(self) -> (f64, f64) {
        match self {
            Activity::General => (16.0, 28.0),
            Activity::Beach => (22.0, 38.0),
            Activity::Ski => (-8.0, 2.0),
        }
    }

    pub fn weights(self) -> ScoreWeights {
        match self {
            Activity::General => ScoreWeights { rain: 30, temp: 35, wind: 15, sun: 20 },
            Activity::Beach => ScoreWeights { rain: 30, temp: 45, wind: 10, sun: 15 },
            Activity::Ski => ScoreWeights { rain: 20, temp: 40, wind: 10, sun: 30 },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Activity::General => "general",
            Activity::Beach => "beach",
            Activity::Ski => "ski",
        }
    }
}
