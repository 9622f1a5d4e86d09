pub mod cache;
pub mod health;
pub mod weather;

use std::time::Duration;

use axum::{
    http::{header, request::Parts, HeaderName, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

const CORS_MAX_AGE_SECS: u64 = 300;

/// Build the API router: `/weather`, `/cache` and `/health`, behind CORS
/// and per-request tracing.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/weather", get(weather::get_weather))
        .route("/cache", get(cache::get_cache))
        .route("/health", get(health::heartbeat))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}

/// Any http(s) origin may call the API with credentials.
fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(is_web_origin))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ACCEPT,
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-csrf-token"),
        ])
        .expose_headers([header::LINK])
        .allow_credentials(true)
        .max_age(Duration::from_secs(CORS_MAX_AGE_SECS))
}

fn is_web_origin(origin: &HeaderValue, _parts: &Parts) -> bool {
    origin
        .to_str()
        .map(|o| o.starts_with("http://") || o.starts_with("https://"))
        .unwrap_or(false)
}
