//! Google Geolocation API client
//!
//! Estimates the device coordinate from visible access points, falling
//! back to IP-based estimation when the scan comes up empty.

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use skytile_core::{Coordinate, Position};

use crate::{ApObservation, LocateError, LocateResult, NullScanner, Positioner, WifiScanner};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Serialize)]
struct GeolocateRequest {
    #[serde(rename = "considerIp")]
    consider_ip: bool,

    #[serde(rename = "wifiAccessPoints", skip_serializing_if = "Vec::is_empty")]
    wifi_access_points: Vec<ApObservation>,
}

#[derive(Debug, Deserialize)]
struct GeolocateResponse {
    location: LatLng,
    accuracy: f64,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Positioner backed by the Google Geolocation API
pub struct GeoLocator {
    client: Client,
    base_url: String,
    api_key: String,
    scanner: Box<dyn WifiScanner>,
}

impl GeoLocator {
    pub fn new(api_key: impl Into<String>) -> LocateResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| LocateError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            scanner: Box::new(NullScanner),
        })
    }

    /// Use a real scan source instead of the IP-only default
    pub fn with_scanner(mut self, scanner: Box<dyn WifiScanner>) -> Self {
        self.scanner = scanner;
        self
    }

    /// Override the API endpoint (tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait::async_trait]
impl Positioner for GeoLocator {
    fn name(&self) -> &str {
        "geolocate"
    }

    async fn lookup(&mut self) -> LocateResult<Position> {
        let access_points = self.scanner.scan();
        debug!("Geolocating with {} access points", access_points.len());

        let url = format!(
            "{}/geolocation/v1/geolocate?key={}",
            self.base_url, self.api_key
        );
        let body = GeolocateRequest {
            consider_ip: true,
            wifi_access_points: access_points,
        };

        let response = self.client.post(&url).json(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                LocateError::Timeout
            } else {
                LocateError::Transport(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(LocateError::Transport(format!(
                "geolocation HTTP {}",
                response.status()
            )));
        }

        let parsed: GeolocateResponse = response
            .json()
            .await
            .map_err(|e| LocateError::InvalidResponse(e.to_string()))?;

        if parsed.accuracy <= 0.0 {
            return Err(LocateError::NoFix(parsed.accuracy));
        }

        let position = Position {
            coordinate: Coordinate::new(parsed.location.lat, parsed.location.lng),
            accuracy_m: parsed.accuracy,
            timestamp: Utc::now(),
        };
        info!(
            "Fix acquired: {:.6}, {:.6} (accuracy {:.0}m)",
            position.coordinate.latitude, position.coordinate.longitude, position.accuracy_m
        );
        Ok(position)
    }
}
