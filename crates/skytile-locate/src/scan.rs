//! Access point observations feeding the geolocation request

use serde::Serialize;

/// One visible access point from a WiFi scan
#[derive(Debug, Clone, Serialize)]
pub struct ApObservation {
    #[serde(rename = "macAddress")]
    pub mac: String,

    /// Received signal strength in dBm
    #[serde(rename = "signalStrength")]
    pub rssi: i32,
}

/// Source of WiFi scan results. Radio access is platform plumbing, so the
/// scanner is injected; lookups still work IP-assisted with no scan data.
pub trait WifiScanner: Send + Sync {
    fn scan(&mut self) -> Vec<ApObservation>;
}

/// Scanner for hosts without an accessible radio
#[derive(Debug, Default)]
pub struct NullScanner;

impl WifiScanner for NullScanner {
    fn scan(&mut self) -> Vec<ApObservation> {
        Vec::new()
    }
}
