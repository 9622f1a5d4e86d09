//! Upstream services the forecast service depends on.
//!
//! Cancellation is not part of these signatures: the caller drops the
//! returned future, which aborts the in-flight HTTP request.

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::types::{Location, Period, WeatherError};

/// Turns a city name into candidate locations.
#[async_trait]
pub trait LocationResolver: Send + Sync {
    /// An empty list means the city is unknown.
    async fn resolve(&self, city: &str) -> Result<Vec<Location>, WeatherError>;
}

/// Fetches forecast periods for a coordinate pair.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch(&self, lat: &str, lon: &str) -> Result<Vec<Period>, WeatherError>;
}

/// Both upstreams answer `200 OK` with a JSON body; any other status,
/// including other 2xx codes, is an error.
pub(crate) fn check_status(status: StatusCode) -> Result<(), WeatherError> {
    match status {
        StatusCode::OK => Ok(()),
        StatusCode::NOT_FOUND => Err(WeatherError::NotFound),
        other => Err(WeatherError::Status(other.as_u16())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_status() {
        assert!(check_status(StatusCode::OK).is_ok());
        assert!(matches!(check_status(StatusCode::NOT_FOUND), Err(WeatherError::NotFound)));
        assert!(matches!(
            check_status(StatusCode::INTERNAL_SERVER_ERROR),
            Err(WeatherError::Status(500))
        ));
        assert!(matches!(check_status(StatusCode::FOUND), Err(WeatherError::Status(302))));
        assert!(matches!(check_status(StatusCode::NO_CONTENT), Err(WeatherError::Status(204))));
        assert!(matches!(check_status(StatusCode::ACCEPTED), Err(WeatherError::Status(202))));
    }
}
