use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use forecaster_core::{NetworkError, ReqwestErrorExt};
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarDay;

/// Geographic location of a city as returned by the geocoder.
///
/// Coordinates stay as the strings the geocoder sent; they are passed
/// through to the forecast API untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub place_id: i64,
    #[serde(default)]
    pub licence: String,
    #[serde(default)]
    pub osm_type: String,
    #[serde(default)]
    pub osm_id: i64,
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub class: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

impl Location {
    pub fn new(lat: impl Into<String>, lon: impl Into<String>) -> Self {
        Self {
            lat: lat.into(),
            lon: lon.into(),
            ..Self::default()
        }
    }
}

/// A forecast period: the half-open interval `[start_time, end_time)` and
/// its text forecast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    #[serde(rename = "startTime")]
    pub start_time: DateTime<FixedOffset>,
    #[serde(rename = "endTime")]
    pub end_time: DateTime<FixedOffset>,
    #[serde(rename = "detailedForecast", default)]
    pub description: String,
}

impl Period {
    /// UTC calendar day the period starts on
    pub fn calendar_day(&self) -> CalendarDay {
        CalendarDay::of(&self.start_time)
    }
}

/// A period selected as the answer for one target day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastDetail {
    #[serde(rename = "startTime")]
    pub start_time: DateTime<FixedOffset>,
    #[serde(rename = "endTime")]
    pub end_time: DateTime<FixedOffset>,
    pub description: String,
}

impl From<Period> for ForecastDetail {
    fn from(period: Period) -> Self {
        Self {
            start_time: period.start_time,
            end_time: period.end_time,
            description: period.description,
        }
    }
}

/// Forecast for one city, ordered today, +1, +2
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityForecast {
    pub name: String,
    pub detail: Vec<ForecastDetail>,
}

/// Result of a batch forecast request
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeatherForecast {
    pub forecast: Vec<CityForecast>,
}

impl WeatherForecast {
    pub fn is_empty(&self) -> bool {
        self.forecast.is_empty()
    }

    pub fn len(&self) -> usize {
        self.forecast.len()
    }
}

/// Full copy of the cache contents, for diagnostics
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheSnapshot {
    pub locations: BTreeMap<String, Location>,
    pub periods: BTreeMap<String, BTreeMap<CalendarDay, Period>>,
}

/// Upstream (geocoder / forecast API) errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Resource not found")]
    NotFound,
    #[error("Unexpected status code: {0}")]
    Status(u16),
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        WeatherError::Network(err.into_network_error())
    }
}

impl WeatherError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, WeatherError::NotFound)
    }
}

/// Batch-level forecast failures.
///
/// Per-city upstream problems never surface here; they only drop the city
/// from the result.
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("Forecast cancelled after {processed} of {requested} cities")]
    Cancelled {
        /// Cities assembled before cancellation was observed
        partial: WeatherForecast,
        processed: usize,
        requested: usize,
    },
}

impl ForecastError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ForecastError::Cancelled { .. } => "The forecast request was cancelled or timed out.",
        }
    }

    /// Forecast assembled before the failure
    pub fn partial(&self) -> &WeatherForecast {
        match self {
            ForecastError::Cancelled { partial, .. } => partial,
        }
    }
}
