//! Trait seams between the scheduler and its collaborators

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::types::{Coordinate, CurrentReading, ForecastFetch, WeatherSnapshot};

/// Provider of current conditions and raw forecast data for a coordinate.
/// Both calls are separate network round-trips; the scheduler treats any
/// failure as opaque and keeps its prior state.
#[async_trait::async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self, coordinate: Coordinate) -> Result<CurrentReading>;

    async fn forecast(&self, coordinate: Coordinate) -> Result<ForecastFetch>;
}

/// Output surface for boot status and published weather state
#[async_trait::async_trait]
pub trait Presenter: Send + Sync {
    /// Show a transient status line (boot phases, terminal errors)
    async fn status(&mut self, message: &str) -> Result<()>;

    /// Replace the rendered state with a fresh snapshot
    async fn publish(&mut self, snapshot: &WeatherSnapshot) -> Result<()>;

    /// Housekeeping hook, called on every scheduler tick so a presenter
    /// can re-render when staleness flips without new data
    async fn tick(&mut self, _now: DateTime<Utc>) -> Result<()> {
        Ok(())
    }
}
