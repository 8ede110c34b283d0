//! HTTP API server for the PitBoy gateway

mod auth;
pub mod health;
pub mod watch;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use secrecy::{ExposeSecret, SecretString};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::chat::{self, ChatProvider};
use crate::speech::{self, SpeechProvider};
use crate::{Config, Result};

/// Maximum accepted request body size
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Shared state for API handlers
///
/// Immutable after startup; every request reads it without locking.
pub struct ApiState {
    /// Shared secret expected in `x-api-key`, if auth is enabled
    pub api_key: Option<SecretString>,
    pub chat: Arc<dyn ChatProvider>,
    pub speech: Arc<dyn SpeechProvider>,
}

/// Build the full router with all routes and layers
pub fn router(state: Arc<ApiState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", watch::router(state))
        .merge(health::router())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    port: u16,
    api_key: Option<SecretString>,
    chat: Arc<dyn ChatProvider>,
    speech: Arc<dyn SpeechProvider>,
}

impl ApiServerBuilder {
    /// Create a new API server builder
    #[must_use]
    pub fn new(port: u16, chat: Arc<dyn ChatProvider>, speech: Arc<dyn SpeechProvider>) -> Self {
        Self {
            port,
            api_key: None,
            chat,
            speech,
        }
    }

    /// Create a builder with providers resolved from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the upstream HTTP client cannot be built
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = config.http_client()?;
        let chat = chat::from_config(&config.chat, client.clone());
        let speech = speech::from_config(&config.speech, client);

        let api_key = config
            .api_key
            .as_ref()
            .map(|k| SecretString::from(k.expose_secret().to_owned()));

        Ok(Self::new(config.port, chat, speech).api_key(api_key))
    }

    /// Set the shared secret required in `x-api-key`
    #[must_use]
    pub fn api_key(mut self, key: Option<SecretString>) -> Self {
        self.api_key = key;
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        let state = Arc::new(ApiState {
            api_key: self.api_key,
            chat: self.chat,
            speech: self.speech,
        });

        ApiServer {
            state,
            port: self.port,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
}

impl ApiServer {
    /// Shared handler state
    #[must_use]
    pub fn state(&self) -> Arc<ApiState> {
        self.state.clone()
    }

    /// Run the API server until the process is interrupted
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr).await?;

        self.serve(listener).await
    }

    /// Serve on an already bound listener
    ///
    /// # Errors
    ///
    /// Returns error if the server fails while running
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        if self.state.api_key.is_none() {
            tracing::warn!("PITBOY_API_KEY not configured - allowing unauthenticated access");
        }

        let local = listener.local_addr()?;
        tracing::info!(
            addr = %local,
            chat = self.state.chat.name(),
            speech = self.state.speech.name(),
            "PitBoy backend listening"
        );

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
