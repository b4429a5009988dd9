//! Provider payload shapes and normalization into core types

use serde::Deserialize;

use skytile_core::{ForecastFetch, ForecastSample};

#[derive(Debug, Deserialize)]
pub struct CurrentPayload {
    /// Place name the provider resolved for the coordinate
    #[serde(default)]
    pub name: Option<String>,

    pub main: MainPayload,

    #[serde(default)]
    pub weather: Vec<ConditionPayload>,
}

#[derive(Debug, Deserialize)]
pub struct MainPayload {
    pub temp: f64,

    #[serde(default)]
    pub humidity: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct ConditionPayload {
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ForecastPayload {
    pub city: CityPayload,
    pub list: Vec<SlotPayload>,
}

#[derive(Debug, Deserialize)]
pub struct CityPayload {
    /// Seconds east of UTC for the queried coordinate
    pub timezone: i64,
}

#[derive(Debug, Deserialize)]
pub struct SlotPayload {
    pub dt: i64,
    pub main: MainPayload,

    #[serde(default)]
    pub weather: Vec<ConditionPayload>,
}

impl CurrentPayload {
    pub fn condition(&self) -> String {
        self.weather
            .first()
            .map(|w| w.description.clone())
            .unwrap_or_default()
    }
}

impl ForecastPayload {
    /// Flatten the provider list into samples, preserving its order
    pub fn into_fetch(self) -> ForecastFetch {
        let samples = self
            .list
            .into_iter()
            .map(|slot| ForecastSample {
                timestamp: slot.dt,
                temperature: slot.main.temp,
                humidity: slot.main.humidity.unwrap_or(0),
                condition: slot
                    .weather
                    .into_iter()
                    .next()
                    .map(|w| w.description)
                    .unwrap_or_default(),
            })
            .collect();

        ForecastFetch {
            utc_offset: self.city.timezone,
            samples,
        }
    }
}
