//! Watch-side client for the PitBoy proxy
//!
//! [`ProxyClient`] speaks the two proxy endpoints. [`Session`] drives
//! dictation, sending and playback as an explicit state machine.

mod abort;
mod session;

pub use abort::{AbortHandle, AbortSignal, abort_pair};
pub use session::{Dictation, Playback, Session, SessionState, Speaker};

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};

use crate::api::watch::{ChatReply, ChatRequest, SpeechReply, SpeechRequest};
use crate::chat::{DEFAULT_SOURCE, NO_RESPONSE};
use crate::config::DEFAULT_TIMEOUT;
use crate::speech::SpeechAudio;
use crate::{Error, Result};

/// Transport from the session to the proxy
#[async_trait]
pub trait Uplink: Send + Sync {
    /// Send an utterance and return the reply text
    ///
    /// # Errors
    ///
    /// Returns error if the proxy is unreachable or answers with a failure
    async fn send(&self, text: &str) -> Result<String>;

    /// Fetch synthesized audio for a reply
    ///
    /// # Errors
    ///
    /// Returns error if the proxy is unreachable, fails, or returns bad audio
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio>;
}

/// HTTP client for the proxy endpoints
pub struct ProxyClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl ProxyClient {
    /// Create a client for the proxy at `base_url`
    ///
    /// Requests give up after [`DEFAULT_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(base_url: &str, api_key: Option<SecretString>) -> Result<Self> {
        Self::with_timeout(base_url, api_key, DEFAULT_TIMEOUT)
    }

    /// Create a client whose requests give up after `timeout`
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn with_timeout(
        base_url: &str,
        api_key: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, api_key))
    }

    /// Create a client reusing an existing HTTP client
    #[must_use]
    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
        api_key: Option<SecretString>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self.client.post(format!("{}{path}", self.base_url));
        match &self.api_key {
            Some(key) => request.header("x-api-key", key.expose_secret()),
            None => request,
        }
    }
}

#[async_trait]
impl Uplink for ProxyClient {
    async fn send(&self, text: &str) -> Result<String> {
        let response = self
            .post("/api/watch-chat")
            .json(&ChatRequest {
                text: Some(text.to_string()),
                source: Some(DEFAULT_SOURCE.to_string()),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "proxy rejected chat request");
            return Err(Error::Client("Server error".to_string()));
        }

        let body = response.bytes().await?;
        Ok(decode_reply(&body))
    }

    async fn synthesize(&self, text: &str) -> Result<SpeechAudio> {
        let response = self
            .post("/api/watch-tts")
            .json(&SpeechRequest {
                text: Some(text.to_string()),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "proxy rejected speech request");
            return Err(Error::Client("Server error".to_string()));
        }

        let reply: SpeechReply = response.json().await?;
        let bytes = base64::engine::general_purpose::STANDARD.decode(reply.audio_base64)?;

        Ok(SpeechAudio {
            bytes,
            mime_type: reply.mime_type,
        })
    }
}

/// Decode a chat response body, tolerating plain-text proxies
fn decode_reply(body: &[u8]) -> String {
    if let Ok(decoded) = serde_json::from_slice::<ChatReply>(body) {
        return decoded.reply;
    }

    std::str::from_utf8(body).map_or_else(|_| NO_RESPONSE.to_string(), ToString::to_string)
}
