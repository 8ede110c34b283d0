//! Speech API synthesis

use async_trait::async_trait;
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};

use super::{SpeechAudio, SpeechProvider};
use crate::config::SpeechConfig;
use crate::{Error, Result};

/// Synthesizes speech through the `/v1/audio/speech` endpoint
pub struct OpenAiSpeechProvider {
    client: Client,
    api_key: Option<SecretString>,
    endpoint: String,
    model: String,
    voice: String,
    format: String,
}

impl OpenAiSpeechProvider {
    /// Create a new speech provider
    #[must_use]
    pub fn new(client: Client, config: &SpeechConfig) -> Self {
        Self {
            client,
            api_key: config
                .openai_api_key
                .as_ref()
                .map(|k| SecretString::from(k.expose_secret().to_owned())),
            endpoint: format!("{}/v1/audio/speech", config.openai_base_url),
            model: config.model.clone(),
            voice: config.voice.clone(),
            format: config.format.clone(),
        }
    }
}

#[async_trait]
impl SpeechProvider for OpenAiSpeechProvider {
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio> {
        #[derive(serde::Serialize)]
        struct TtsRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            response_format: &'a str,
        }

        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| Error::Upstream("OPENAI_API_KEY missing".to_string()))?;

        let request = TtsRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            response_format: &self.format,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!("TTS API error: {status} {body}")));
        }

        let mime_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|ct| ct.starts_with("audio/"))
            .map_or_else(|| mime_type_for_format(&self.format).to_string(), ToString::to_string);

        let bytes = response.bytes().await?.to_vec();
        tracing::debug!(bytes = bytes.len(), %mime_type, "synthesized speech");

        Ok(SpeechAudio { bytes, mime_type })
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// MIME type for a speech API output format
#[must_use]
pub fn mime_type_for_format(format: &str) -> &'static str {
    match format.to_ascii_lowercase().as_str() {
        "mp3" => "audio/mpeg",
        "opus" => "audio/ogg",
        "aac" => "audio/aac",
        "flac" => "audio/flac",
        "wav" => "audio/wav",
        "pcm" => "audio/pcm",
        _ => "application/octet-stream",
    }
}
