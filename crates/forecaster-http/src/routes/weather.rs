use std::borrow::Cow;

use axum::{
    extract::{Query, State},
    Json,
};
use forecaster_weather::WeatherForecast;
use tracing::{debug, info, instrument};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// `GET /weather?city=a,b,c`. When `city` is repeated only the first value
/// counts.
#[instrument(skip_all)]
pub async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Json<WeatherForecast>> {
    let raw = first_value(&params, "city").unwrap_or_default();
    let cities = parse_cities(raw)?;
    debug!(?cities, "forecast requested");

    let (cancel, _guard) = state.request_token();
    let forecast = state.service.get_forecast(&cities, &cancel).await?;

    info!(requested = cities.len(), returned = forecast.len(), "forecast served");
    Ok(Json(forecast))
}

fn first_value<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Split a comma separated city list. Each entry is trimmed and then
/// percent-decoded (`+` is a space); blank entries are dropped.
pub fn parse_cities(raw: &str) -> ApiResult<Vec<String>> {
    let cities = raw
        .split(',')
        .map(str::trim)
        .filter(|city| !city.is_empty())
        .map(decode_city)
        .collect::<ApiResult<Vec<_>>>()?;

    if cities.is_empty() {
        return Err(ApiError::missing_cities());
    }
    Ok(cities)
}

fn decode_city(city: &str) -> ApiResult<String> {
    if has_malformed_escape(city) {
        return Err(ApiError::invalid_city(city));
    }

    let spaced = city.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(Cow::into_owned)
        .map_err(|_| ApiError::invalid_city(city))
}

/// `%` must be followed by two hex digits.
fn has_malformed_escape(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return true;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_first_value_wins() {
        let params = vec![
            ("units".to_string(), "metric".to_string()),
            ("city".to_string(), "london".to_string()),
            ("city".to_string(), "paris".to_string()),
        ];
        assert_eq!(first_value(&params, "city"), Some("london"));
        assert_eq!(first_value(&params, "lang"), None);
    }

    #[test]
    fn test_parse_single_city() {
        assert_eq!(parse_cities("london").unwrap(), vec!["london"]);
    }

    #[test]
    fn test_parse_trims_and_keeps_order() {
        assert_eq!(
            parse_cities(" paris , london,rome ").unwrap(),
            vec!["paris", "london", "rome"]
        );
    }

    #[test]
    fn test_parse_decodes_escapes_and_plus() {
        assert_eq!(
            parse_cities("new+york,S%C3%A3o%20Paulo").unwrap(),
            vec!["new york", "São Paulo"]
        );
    }

    #[test]
    fn test_parse_keeps_duplicates() {
        assert_eq!(parse_cities("rome,rome").unwrap(), vec!["rome", "rome"]);
    }

    #[test]
    fn test_parse_drops_blank_entries() {
        assert_eq!(parse_cities("rome,, ,oslo").unwrap(), vec!["rome", "oslo"]);
    }

    #[test]
    fn test_parse_empty_is_missing_cities() {
        assert_eq!(parse_cities("").unwrap_err().code, ErrorCode::MissingCities);
        assert_eq!(parse_cities(" , ").unwrap_err().code, ErrorCode::MissingCities);
    }

    #[test]
    fn test_parse_rejects_malformed_escape() {
        assert_eq!(parse_cities("lon%zzdon").unwrap_err().code, ErrorCode::InvalidCity);
        assert_eq!(parse_cities("london%").unwrap_err().code, ErrorCode::InvalidCity);
        assert_eq!(parse_cities("london%4").unwrap_err().code, ErrorCode::InvalidCity);
    }

    #[test]
    fn test_parse_rejects_invalid_utf8() {
        assert_eq!(parse_cities("%FF%FE").unwrap_err().code, ErrorCode::InvalidCity);
    }
}
