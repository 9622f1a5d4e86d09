//! `GET /cache`: dump of the in-memory cache for debugging.

use axum::{extract::State, Json};
use forecaster_weather::CacheSnapshot;

use crate::state::AppState;

pub async fn get_cache(State(state): State<AppState>) -> Json<CacheSnapshot> {
    Json(state.service.cache_snapshot())
}
