//! National Weather Service (`api.weather.gov`) forecast client.
//!
//! A forecast takes two requests: `/points/{lat},{lon}` yields the URL of
//! the gridpoint forecast, which in turn lists the periods.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::gateway::{check_status, ForecastSource};
use crate::types::{Period, WeatherError};

const USER_AGENT: &str = concat!("forecaster/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct PointsResponse {
    properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
struct PointsProperties {
    forecast: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    properties: ForecastProperties,
}

#[derive(Debug, Deserialize)]
struct ForecastProperties {
    #[serde(default)]
    periods: Vec<Period>,
}

#[derive(Debug, Clone)]
pub struct NwsClient {
    client: Client,
    base_url: String,
}

impl NwsClient {
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve the gridpoint forecast URL for a coordinate pair.
    #[instrument(skip(self), level = "info")]
    pub async fn forecast_url(&self, lat: &str, lon: &str) -> Result<String, WeatherError> {
        let url = format!("{}/points/{},{}", self.base_url, lat, lon);
        tracing::debug!("Fetching NWS points: {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/geo+json")
            .send()
            .await?;

        check_status(response.status())?;

        let points: PointsResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        Ok(points.properties.forecast)
    }

    /// Fetch the periods listed at a gridpoint forecast URL.
    #[instrument(skip(self), level = "info")]
    pub async fn forecast_periods(&self, forecast_url: &str) -> Result<Vec<Period>, WeatherError> {
        let response = self
            .client
            .get(forecast_url)
            .header("Accept", "application/geo+json")
            .send()
            .await?;

        check_status(response.status())?;

        let forecast: ForecastResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        tracing::debug!("Got {} forecast periods", forecast.properties.periods.len());
        Ok(forecast.properties.periods)
    }
}

#[async_trait]
impl ForecastSource for NwsClient {
    async fn fetch(&self, lat: &str, lon: &str) -> Result<Vec<Period>, WeatherError> {
        let forecast_url = self.forecast_url(lat, lon).await?;
        self.forecast_periods(&forecast_url).await
    }
}
