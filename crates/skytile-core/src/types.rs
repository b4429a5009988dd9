//! Core data types for position and weather state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp type (Unix epoch seconds, UTC)
pub type Timestamp = i64;

/// Signed seconds east of UTC, supplied by the weather provider per query.
/// Every local-date derivation within one aggregation pass uses the same
/// offset value.
pub type UtcOffset = i64;

/// Geographic coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// One geolocation fix. Superseded by the next accepted fix, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub coordinate: Coordinate,

    /// Estimated accuracy in meters; zero or negative means the fix is unusable
    pub accuracy_m: f64,

    pub timestamp: DateTime<Utc>,
}

impl Position {
    pub fn is_valid(&self) -> bool {
        self.accuracy_m > 0.0
    }
}

/// One 3-hour forecast slot as returned by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    /// Unix timestamp of the slot (UTC)
    pub timestamp: Timestamp,

    pub temperature: f64,

    /// Relative humidity, 0-100
    pub humidity: u8,

    /// Provider condition text ("light rain", "clear sky", ...)
    pub condition: String,
}

/// Current conditions, overwritten wholesale on each successful fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentReading {
    pub temperature: i32,

    pub condition: String,

    /// Place name the provider resolved for the queried coordinate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    pub fetched_at: DateTime<Utc>,
}

/// One aggregated day slot on the panel (index 0 = today)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayBucket {
    /// Calendar date, zero-padded "YYYY-MM-DD"
    pub date: String,

    /// Three-letter day name ("Sun".."Sat")
    pub day_name: String,

    /// Zero-padded "MM-DD" for the tile header
    pub display_date: String,

    pub temp_high: i32,
    pub temp_low: i32,

    /// Averaged humidity, 0 when the slot received no samples
    pub humidity: u8,

    pub description: String,
}

/// Raw forecast response normalized for aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastFetch {
    pub utc_offset: UtcOffset,
    pub samples: Vec<ForecastSample>,
}

/// Published display state, replaced as a unit on each successful refresh
/// so a renderer never observes a mix of old and new buckets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub days: [DayBucket; 3],
    pub current: CurrentReading,
    pub fetched_at: DateTime<Utc>,
}

/// Unit system for provider queries and display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Imperial,
    Metric,
}

impl Units {
    /// Value for the provider's `units` query parameter
    pub fn query_value(&self) -> &'static str {
        match self {
            Units::Imperial => "imperial",
            Units::Metric => "metric",
        }
    }

    /// Temperature suffix on the panel
    pub fn suffix(&self) -> &'static str {
        match self {
            Units::Imperial => "F",
            Units::Metric => "C",
        }
    }

    /// Parse a configuration value; anything unrecognized falls back to imperial
    pub fn from_name(name: &str) -> Self {
        match name {
            "metric" => Units::Metric,
            _ => Units::Imperial,
        }
    }
}
