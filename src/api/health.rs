//! Health check endpoint

use axum::{Json, Router, routing::get};
use serde::Serialize;

/// Service name reported by the health endpoint
pub const SERVICE_NAME: &str = "pitboy-backend";

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
}

/// Liveness probe
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        service: SERVICE_NAME,
    })
}

/// Build health router (no state needed)
pub fn router() -> Router {
    Router::new().route("/health", get(health))
}
