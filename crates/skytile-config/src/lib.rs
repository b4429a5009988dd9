//! Appliance configuration
//!
//! TOML file selected by SKYTILE_CONFIG (default `skytile.toml`), with
//! environment overrides for the API keys. Keys left at their placeholder
//! values are rejected before any network use.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use skytile_core::{Coordinate, Units, DEFAULT_CHANGE_THRESHOLD_KM};

/// Default weather refresh cadence (30 minutes)
pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 1800;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    pub openweather_key: Option<String>,
    pub geolocation_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StationConfig {
    /// Coordinate used only when geolocation fails at boot
    pub fallback_latitude: Option<f64>,
    pub fallback_longitude: Option<f64>,
    pub units: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScheduleConfig {
    pub update_interval_secs: Option<u64>,
    pub location_threshold_km: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub presenter: Option<String>,
    pub data_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub api: Option<ApiConfig>,
    pub station: Option<StationConfig>,
    pub schedule: Option<ScheduleConfig>,
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl AppConfig {
    /// Load configuration from the SKYTILE_CONFIG path (TOML) if present,
    /// with reasonable defaults otherwise
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("SKYTILE_CONFIG").unwrap_or_else(|_| "skytile.toml".to_string());
        Self::load_from(path)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let cfg = if path.exists() {
            let s = fs::read_to_string(path)?;
            toml::from_str::<AppConfig>(&s)?
        } else {
            AppConfig::default()
        };
        Ok(cfg)
    }

    /// OpenWeatherMap API key; OPENWEATHER_API_KEY overrides the file
    pub fn openweather_key(&self) -> Option<String> {
        std::env::var("OPENWEATHER_API_KEY")
            .ok()
            .or_else(|| self.api.as_ref().and_then(|a| a.openweather_key.clone()))
    }

    /// Geolocation API key; GEOLOCATION_API_KEY overrides the file
    pub fn geolocation_key(&self) -> Option<String> {
        std::env::var("GEOLOCATION_API_KEY")
            .ok()
            .or_else(|| self.api.as_ref().and_then(|a| a.geolocation_key.clone()))
    }

    /// Weather refresh cadence (default 30 minutes)
    pub fn update_interval_secs(&self) -> u64 {
        self.schedule
            .as_ref()
            .and_then(|s| s.update_interval_secs)
            .unwrap_or(DEFAULT_UPDATE_INTERVAL_SECS)
    }

    /// Distance gate threshold (default 5 km)
    pub fn location_threshold_km(&self) -> f64 {
        self.schedule
            .as_ref()
            .and_then(|s| s.location_threshold_km)
            .unwrap_or(DEFAULT_CHANGE_THRESHOLD_KM)
    }

    /// Static coordinate used when geolocation fails at boot
    pub fn fallback_coordinate(&self) -> Option<Coordinate> {
        let station = self.station.as_ref()?;
        Some(Coordinate::new(
            station.fallback_latitude?,
            station.fallback_longitude?,
        ))
    }

    pub fn units(&self) -> Units {
        self.station
            .as_ref()
            .and_then(|s| s.units.as_deref())
            .map(Units::from_name)
            .unwrap_or_default()
    }

    /// Presenter selection (default "console")
    pub fn presenter(&self) -> String {
        self.display
            .as_ref()
            .and_then(|d| d.presenter.clone())
            .unwrap_or_else(|| "console".to_string())
    }

    /// Directory for the JSONL presenter (default "data")
    pub fn data_dir(&self) -> String {
        self.display
            .as_ref()
            .and_then(|d| d.data_dir.clone())
            .unwrap_or_else(|| "data".to_string())
    }

    /// Reject missing or placeholder keys before anything goes online.
    /// Location needs either a geolocation key or a complete fallback
    /// coordinate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let key = self
            .openweather_key()
            .ok_or_else(|| ConfigError::Invalid("openweather_key is not set".to_string()))?;
        if is_placeholder(&key) {
            return Err(ConfigError::Invalid(
                "openweather_key is still the placeholder value".to_string(),
            ));
        }

        match self.geolocation_key() {
            Some(key) if is_placeholder(&key) => Err(ConfigError::Invalid(
                "geolocation_key is still the placeholder value".to_string(),
            )),
            Some(_) => Ok(()),
            None if self.fallback_coordinate().is_none() => Err(ConfigError::Invalid(
                "either geolocation_key or a fallback coordinate is required".to_string(),
            )),
            None => Ok(()),
        }
    }
}

fn is_placeholder(key: &str) -> bool {
    key.trim().is_empty() || key.starts_with("your_")
}
