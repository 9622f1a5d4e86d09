//! Forward geocoding: convert a city name to coordinates.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::instrument;

use crate::gateway::{check_status, LocationResolver};
use crate::types::{Location, WeatherError};

const USER_AGENT: &str = concat!("forecaster/", env!("CARGO_PKG_VERSION"));

/// Nominatim search client
#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: Client,
    base_url: String,
}

impl NominatimClient {
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Search for a free-form place name. Nominatim returns candidates
    /// ordered by importance.
    #[instrument(skip(self), level = "info")]
    pub async fn search(&self, city: &str) -> Result<Vec<Location>, WeatherError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", city), ("format", "json")])
            .send()
            .await?;

        check_status(response.status())?;

        let locations: Vec<Location> = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        tracing::debug!("Nominatim returned {} candidates for {}", locations.len(), city);
        Ok(locations)
    }
}

#[async_trait]
impl LocationResolver for NominatimClient {
    async fn resolve(&self, city: &str) -> Result<Vec<Location>, WeatherError> {
        self.search(city).await
    }
}
