use axum::{http::StatusCode, response::IntoResponse};

/// GET /health - heartbeat
pub async fn heartbeat() -> impl IntoResponse {
    (StatusCode::OK, ".")
}
