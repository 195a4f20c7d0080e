//! Liveness endpoint.

use axum::{http::StatusCode, response::IntoResponse, Json};

/// `GET /api/health` - process is up and serving requests.
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "ok", "message": "API is running" })),
    )
}
