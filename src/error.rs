//! Error types for the PitBoy gateway

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the PitBoy gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Upstream provider failed or is missing a credential
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Configured provider has no implementation
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Client-side failure talking to the proxy
    #[error("client error: {0}")]
    Client(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Base64 decoding error
    #[error("decode error: {0}")]
    Decode(#[from] base64::DecodeError),
}
