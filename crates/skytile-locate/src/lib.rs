//! Position acquisition for the weather panel
//!
//! Wraps WiFi/IP geolocation behind the `Positioner` trait. The real
//! implementation posts visible access points to the Google Geolocation
//! API; a static implementation serves the configured fallback coordinate.

pub mod fixed;
pub mod geolocate;
pub mod scan;

pub use fixed::*;
pub use geolocate::*;
pub use scan::*;

use skytile_core::Position;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No usable fix (accuracy {0}m)")]
    NoFix(f64),

    #[error("Timeout waiting for a fix")]
    Timeout,
}

pub type LocateResult<T> = Result<T, LocateError>;

/// Trait for all position sources
#[async_trait::async_trait]
pub trait Positioner: Send + Sync {
    /// Source name/identifier
    fn name(&self) -> &str;

    /// Acquire one position fix (blocking)
    async fn lookup(&mut self) -> LocateResult<Position>;
}
