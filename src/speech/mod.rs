//! Speech synthesis providers
//!
//! Only the `openai` provider is implemented. Any other configured name
//! resolves to [`UnsupportedProvider`], which fails on every call.

mod openai;

pub use openai::{OpenAiSpeechProvider, mime_type_for_format};

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::SpeechConfig;
use crate::{Error, Result};

/// Synthesized audio and its MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Trait for speech synthesis providers
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize speech for the given text
    ///
    /// # Errors
    ///
    /// Returns error if the provider is unsupported, misconfigured, or the
    /// upstream fails
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Placeholder for a provider name with no implementation
#[derive(Debug, Clone)]
pub struct UnsupportedProvider {
    name: String,
}

#[async_trait]
impl SpeechProvider for UnsupportedProvider {
    async fn synthesize(&self, _text: &str) -> Result<SpeechAudio> {
        Err(Error::UnsupportedProvider(format!(
            "TTS provider {:?}",
            self.name
        )))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Build the configured speech provider
#[must_use]
pub fn from_config(config: &SpeechConfig, client: reqwest::Client) -> Arc<dyn SpeechProvider> {
    if config.provider.eq_ignore_ascii_case("openai") {
        tracing::info!(
            model = %config.model,
            voice = %config.voice,
            format = %config.format,
            "speech provider selected"
        );
        Arc::new(OpenAiSpeechProvider::new(client, config))
    } else {
        tracing::warn!(
            provider = %config.provider,
            "unsupported TTS provider configured, synthesis requests will fail"
        );
        Arc::new(UnsupportedProvider {
            name: config.provider.clone(),
        })
    }
}
