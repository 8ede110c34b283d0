//! Configuration management for the PitBoy gateway
//!
//! Everything is read from environment-style key/value pairs. Blank values
//! count as unset so an empty `PITBOY_API_KEY=` line disables auth instead of
//! requiring an empty header.

use std::time::Duration;

use secrecy::SecretString;

use crate::{Error, Result};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8787;

/// Default timeout for upstream and proxy requests
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default upstream base URL for the chat and speech APIs
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Default system instruction sent with every primary-chat request
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Jarvis, concise and practical.";

/// Upstream provider used to answer chat requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatProviderKind {
    /// Local echo, no upstream
    #[default]
    Echo,
    /// Chat-completion API
    PrimaryChat,
    /// Alternate chat gateway reached over a configured URL
    AlternateGateway,
}

impl ChatProviderKind {
    /// Parse a provider name, case-insensitively
    ///
    /// Unknown names fall back to [`ChatProviderKind::Echo`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "echo" => Self::Echo,
            "primary-chat" | "openai" => Self::PrimaryChat,
            "alternate-gateway" | "openclaw" => Self::AlternateGateway,
            other => {
                tracing::warn!(provider = other, "unknown chat provider, falling back to echo");
                Self::Echo
            }
        }
    }

    /// Canonical provider name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Echo => "echo",
            Self::PrimaryChat => "primary-chat",
            Self::AlternateGateway => "alternate-gateway",
        }
    }
}

/// Chat proxy configuration
#[derive(Debug)]
pub struct ChatConfig {
    /// Selected provider
    pub provider: ChatProviderKind,

    /// Chat API key (`OPENAI_API_KEY`)
    pub openai_api_key: Option<SecretString>,

    /// Chat API base URL
    pub openai_base_url: String,

    /// Chat completion model (`OPENAI_MODEL`)
    pub model: String,

    /// System instruction (`SYSTEM_PROMPT`)
    pub system_prompt: String,

    /// Alternate gateway URL (`OPENCLAW_CHAT_URL`)
    pub gateway_url: Option<String>,

    /// Alternate gateway bearer token (`OPENCLAW_BEARER_TOKEN`)
    pub gateway_token: Option<SecretString>,
}

/// Speech synthesis configuration
#[derive(Debug)]
pub struct SpeechConfig {
    /// Provider name (`TTS_PROVIDER`); only `openai` is implemented
    pub provider: String,

    /// Speech API key (`OPENAI_API_KEY`)
    pub openai_api_key: Option<SecretString>,

    /// Speech API base URL
    pub openai_base_url: String,

    /// TTS model (`OPENAI_TTS_MODEL`)
    pub model: String,

    /// TTS voice (`OPENAI_TTS_VOICE`)
    pub voice: String,

    /// Output format (`OPENAI_TTS_FORMAT`)
    pub format: String,
}

/// Gateway configuration
#[derive(Debug)]
pub struct Config {
    /// Port to listen on (`PORT`)
    pub port: u16,

    /// Shared secret expected in `x-api-key` (`PITBOY_API_KEY`)
    pub api_key: Option<SecretString>,

    /// Chat proxy configuration
    pub chat: ChatConfig,

    /// Speech synthesis configuration
    pub speech: SpeechConfig,

    /// Timeout applied to every upstream request (`UPSTREAM_TIMEOUT_SECS`)
    pub upstream_timeout: Duration,
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns error if a numeric option cannot be parsed
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value lookup
    ///
    /// # Errors
    ///
    /// Returns error if a numeric option cannot be parsed
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let secret = |key: &str| get(key).map(SecretString::from);

        let port = match get("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| Error::Config(format!("invalid PORT {raw:?}: {e}")))?,
            None => DEFAULT_PORT,
        };

        let upstream_timeout = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.parse().map_err(|e| {
                Error::Config(format!("invalid UPSTREAM_TIMEOUT_SECS {raw:?}: {e}"))
            })?),
            None => DEFAULT_TIMEOUT,
        };

        let openai_base_url = get("OPENAI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let chat = ChatConfig {
            provider: get("CHAT_PROVIDER")
                .map(|p| ChatProviderKind::from_name(&p))
                .unwrap_or_default(),
            openai_api_key: secret("OPENAI_API_KEY"),
            openai_base_url: openai_base_url.clone(),
            model: get("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            system_prompt: get("SYSTEM_PROMPT")
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            gateway_url: get("OPENCLAW_CHAT_URL"),
            gateway_token: secret("OPENCLAW_BEARER_TOKEN"),
        };

        let speech = SpeechConfig {
            provider: get("TTS_PROVIDER").unwrap_or_else(|| "openai".to_string()),
            openai_api_key: secret("OPENAI_API_KEY"),
            openai_base_url,
            model: get("OPENAI_TTS_MODEL").unwrap_or_else(|| "gpt-4o-mini-tts".to_string()),
            voice: get("OPENAI_TTS_VOICE").unwrap_or_else(|| "alloy".to_string()),
            format: get("OPENAI_TTS_FORMAT").unwrap_or_else(|| "mp3".to_string()),
        };

        Ok(Self {
            port,
            api_key: secret("PITBOY_API_KEY"),
            chat,
            speech,
            upstream_timeout,
        })
    }

    /// Build the shared HTTP client used for upstream calls
    ///
    /// # Errors
    ///
    /// Returns error if the TLS backend cannot be initialized
    pub fn http_client(&self) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .timeout(self.upstream_timeout)
            .build()?)
    }
}
