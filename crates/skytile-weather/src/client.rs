//! HTTP client for the two provider round-trips

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use skytile_core::{Coordinate, CurrentReading, ForecastFetch, Units, WeatherSource};

use crate::response::{CurrentPayload, ForecastPayload};
use crate::{WeatherError, WeatherResult};

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Number of 3-hour slots to request (5 days worth)
const FORECAST_SLOTS: u32 = 40;

/// OpenWeatherMap API client
pub struct OwmClient {
    client: Client,
    base_url: String,
    api_key: String,
    units: Units,
}

impl OwmClient {
    pub fn new(api_key: impl Into<String>, units: Units) -> WeatherResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            units,
        })
    }

    /// Override the API endpoint (tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn base_query(&self, coordinate: Coordinate) -> Vec<(&'static str, String)> {
        vec![
            ("lat", format!("{:.6}", coordinate.latitude)),
            ("lon", format!("{:.6}", coordinate.longitude)),
            ("appid", self.api_key.clone()),
            ("units", self.units.query_value().to_string()),
        ]
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> WeatherResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).query(query).send().await?;

        if !response.status().is_success() {
            return Err(WeatherError::Http(response.status().as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))
    }

    /// Fetch current conditions for a coordinate
    pub async fn fetch_current(&self, coordinate: Coordinate) -> WeatherResult<CurrentReading> {
        debug!(
            "Fetching current conditions for {:.6}, {:.6}",
            coordinate.latitude, coordinate.longitude
        );
        let payload: CurrentPayload = self
            .get_json("/data/2.5/weather", &self.base_query(coordinate))
            .await?;

        let reading = CurrentReading {
            temperature: payload.main.temp.round() as i32,
            condition: payload.condition(),
            city: payload.name,
            fetched_at: Utc::now(),
        };
        if let Some(city) = &reading.city {
            info!("Provider resolved location: {}", city);
        }
        Ok(reading)
    }

    /// Fetch the ordered 3-hour forecast list plus the local UTC offset
    pub async fn fetch_forecast(&self, coordinate: Coordinate) -> WeatherResult<ForecastFetch> {
        let mut query = self.base_query(coordinate);
        query.push(("cnt", FORECAST_SLOTS.to_string()));

        let payload: ForecastPayload = self.get_json("/data/2.5/forecast", &query).await?;
        let fetch = payload.into_fetch();

        debug!(
            "Forecast: {} slots, offset {}s",
            fetch.samples.len(),
            fetch.utc_offset
        );
        Ok(fetch)
    }
}

#[async_trait::async_trait]
impl WeatherSource for OwmClient {
    async fn current(&self, coordinate: Coordinate) -> anyhow::Result<CurrentReading> {
        Ok(self.fetch_current(coordinate).await?)
    }

    async fn forecast(&self, coordinate: Coordinate) -> anyhow::Result<ForecastFetch> {
        Ok(self.fetch_forecast(coordinate).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn coordinate() -> Coordinate {
        Coordinate::new(47.476, -118.255)
    }

    async fn client(server: &MockServer) -> OwmClient {
        OwmClient::new("test-key", Units::Imperial)
            .unwrap()
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_fetch_current() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("appid", "test-key"))
            .and(query_param("units", "imperial"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "Harrington",
                "main": {"temp": 71.4, "humidity": 38},
                "weather": [{"description": "clear sky"}]
            })))
            .mount(&server)
            .await;

        let reading = client(&server).await.fetch_current(coordinate()).await.unwrap();

        assert_eq!(reading.temperature, 71);
        assert_eq!(reading.condition, "clear sky");
        assert_eq!(reading.city.as_deref(), Some("Harrington"));
    }

    #[tokio::test]
    async fn test_fetch_forecast() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .and(query_param("cnt", "40"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "city": {"timezone": -25200},
                "list": [
                    {"dt": 1717257600, "main": {"temp": 68.0, "humidity": 40},
                     "weather": [{"description": "few clouds"}]}
                ]
            })))
            .mount(&server)
            .await;

        let fetch = client(&server).await.fetch_forecast(coordinate()).await.unwrap();

        assert_eq!(fetch.utc_offset, -25_200);
        assert_eq!(fetch.samples.len(), 1);
        assert_eq!(fetch.samples[0].temperature, 68.0);
    }

    #[tokio::test]
    async fn test_non_200_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = client(&server).await.fetch_current(coordinate()).await;
        assert!(matches!(result, Err(WeatherError::Http(401))));
    }

    #[tokio::test]
    async fn test_garbage_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result = client(&server).await.fetch_forecast(coordinate()).await;
        assert!(matches!(result, Err(WeatherError::Parse(_))));
    }
}
