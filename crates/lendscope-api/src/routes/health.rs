//! Health check endpoint

use axum::Json;

use crate::dto::HealthResponse;

/// GET /health - Liveness of the service itself, not of the market API
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}
