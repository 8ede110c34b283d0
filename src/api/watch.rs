//! Watch-facing chat and speech endpoints

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::post,
};
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::{ApiState, auth};
use crate::chat::DEFAULT_SOURCE;

/// Build the protected watch router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/watch-chat", post(watch_chat))
        .route("/watch-tts", post(watch_tts))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ))
        .with_state(state)
}

/// Chat request body
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Chat response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

/// Speech request body
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SpeechRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Speech response body
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechReply {
    pub audio_base64: String,
    pub mime_type: String,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Forward an utterance to the configured chat provider
async fn watch_chat(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(request) = payload.map_err(ApiError::rejected)?;

    let text = required_text(request.text.as_deref())?;

    let source = request
        .source
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SOURCE)
        .trim();

    tracing::debug!(provider = state.chat.name(), source, chars = text.len(), "watch chat");

    let reply = state.chat.generate(text, source).await.map_err(|e| {
        tracing::error!(
            route = "watch-chat",
            provider = state.chat.name(),
            error = %e,
            "chat failed"
        );
        ApiError::Server
    })?;

    Ok(Json(ChatReply { reply }))
}

/// Synthesize speech for a reply
async fn watch_tts(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<SpeechRequest>, JsonRejection>,
) -> Result<Json<SpeechReply>, ApiError> {
    let Json(request) = payload.map_err(ApiError::rejected)?;

    let text = required_text(request.text.as_deref())?;

    let audio = state.speech.synthesize(text).await.map_err(|e| {
        tracing::error!(
            route = "watch-tts",
            provider = state.speech.name(),
            error = %e,
            "synthesis failed"
        );
        ApiError::Server
    })?;

    Ok(Json(SpeechReply {
        audio_base64: base64::engine::general_purpose::STANDARD.encode(&audio.bytes),
        mime_type: audio.mime_type,
    }))
}

/// Trimmed request text; absent, null and blank all count as missing
fn required_text(text: Option<&str>) -> Result<&str, ApiError> {
    match text.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(ApiError::BadRequest("Missing text")),
    }
}

/// Boundary errors
///
/// Bodies carry a fixed message only; details stay in the server log.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    BadRequest(&'static str),
    Server,
}

impl ApiError {
    fn rejected(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "rejected request body");
        Self::BadRequest("Invalid request body")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Server => (StatusCode::INTERNAL_SERVER_ERROR, "Server error"),
        };

        (
            status,
            Json(ErrorBody {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}
