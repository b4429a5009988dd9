//! OpenWeatherMap client
//!
//! Two provider round-trips per refresh: current conditions and the
//! 5-day/3-hour forecast list. Payloads are normalized into core types
//! before anything downstream sees them.

pub mod client;
pub mod response;

pub use client::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Provider returned HTTP {0}")]
    Http(u16),

    #[error("Malformed payload: {0}")]
    Parse(String),
}

pub type WeatherResult<T> = Result<T, WeatherError>;
