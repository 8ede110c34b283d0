//! Shared-secret authentication middleware

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use secrecy::ExposeSecret;

use super::ApiState;
use super::watch::ApiError;

/// Header carrying the shared secret
pub const API_KEY_HEADER: &str = "x-api-key";

/// Extract the trimmed shared secret from the `x-api-key` header
fn extract_api_key(req: &Request) -> Option<&str> {
    req.headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Middleware to verify the shared secret
///
/// Runs before body extraction, so a bad key yields 401 whatever the body is.
pub async fn require_api_key(
    State(state): State<Arc<ApiState>>,
    req: Request,
    next: Next,
) -> Response {
    // No secret configured: auth disabled
    let Some(expected_key) = &state.api_key else {
        return next.run(req).await;
    };

    match extract_api_key(&req) {
        Some(key) if key == expected_key.expose_secret() => next.run(req).await,
        Some(_) => {
            tracing::warn!(path = %req.uri().path(), "invalid API key provided");
            ApiError::Unauthorized.into_response()
        }
        None => {
            tracing::debug!(path = %req.uri().path(), "no API key provided");
            ApiError::Unauthorized.into_response()
        }
    }
}
