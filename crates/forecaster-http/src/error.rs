//! Error responses for the HTTP surface.
//!
//! Every failure is rendered as JSON `{ "code": ..., "message": ... }` with
//! the status code its [`ErrorCode`] maps to.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use forecaster_weather::ForecastError;
use serde::{Deserialize, Serialize};

/// Category of an API failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// `city` query parameter missing or empty
    MissingCities,

    /// A city name could not be percent-decoded
    InvalidCity,

    /// The request deadline passed or the server is shutting down
    Cancelled,
}

impl ErrorCode {
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorCode::MissingCities | ErrorCode::InvalidCity => StatusCode::BAD_REQUEST,
            ErrorCode::Cancelled => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{code:?}: {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn missing_cities() -> Self {
        Self::new(ErrorCode::MissingCities, "Please provide a list of cities")
    }

    pub fn invalid_city(city: &str) -> Self {
        Self::new(ErrorCode::InvalidCity, format!("Unable to decode city name: {}", city))
    }

    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }
}

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        match &err {
            ForecastError::Cancelled {
                processed, requested, ..
            } => {
                tracing::warn!(processed, requested, "forecast request cancelled");
                Self::new(ErrorCode::Cancelled, err.user_message())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use forecaster_weather::WeatherForecast;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::missing_cities().status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::invalid_city("%zz").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::Cancelled.status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_error_body_shape() {
        let value = serde_json::to_value(ApiError::missing_cities()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "code": "MISSING_CITIES",
                "message": "Please provide a list of cities"
            })
        );
    }

    #[test]
    fn test_cancellation_maps_to_gateway_timeout() {
        let err = ApiError::from(ForecastError::Cancelled {
            partial: WeatherForecast::default(),
            processed: 1,
            requested: 3,
        });
        assert_eq!(err.code, ErrorCode::Cancelled);
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }
}
