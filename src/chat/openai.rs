//! Chat-completion provider

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{ChatProvider, NO_RESPONSE};
use crate::config::ChatConfig;
use crate::{Error, Result};

const TEMPERATURE: f64 = 0.4;

/// Forwards each utterance as a single user turn behind a system instruction
pub struct OpenAiChatProvider {
    client: Client,
    api_key: Option<SecretString>,
    endpoint: String,
    model: String,
    system_prompt: String,
}

impl OpenAiChatProvider {
    /// Create a new chat-completion provider
    #[must_use]
    pub fn new(client: Client, config: &ChatConfig) -> Self {
        Self {
            client,
            api_key: config
                .openai_api_key
                .as_ref()
                .map(|k| SecretString::from(k.expose_secret().to_owned())),
            endpoint: format!("{}/v1/chat/completions", config.openai_base_url),
            model: config.model.clone(),
            system_prompt: config.system_prompt.clone(),
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAiChatProvider {
    async fn generate(&self, text: &str, _source: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| Error::Upstream("OPENAI_API_KEY missing".to_string()))?;

        let request = ChatCompletionRequest {
            model: &self.model,
            messages: [
                Message {
                    role: "system",
                    content: &self.system_prompt,
                },
                Message {
                    role: "user",
                    content: text,
                },
            ],
            temperature: TEMPERATURE,
        };

        tracing::debug!(model = %self.model, "sending chat completion");

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
            return Err(Error::Upstream(format!("chat API error: {status} {body}")));
        }

        let result: ChatCompletionResponse = response.json().await?;

        Ok(first_choice_text(&result).unwrap_or_else(|| NO_RESPONSE.to_string()))
    }

    fn name(&self) -> &'static str {
        "primary-chat"
    }
}

/// Trimmed content of the first completion, if it has any
fn first_choice_text(response: &ChatCompletionResponse) -> Option<String> {
    response
        .choices
        .first()
        .and_then(|c| c.message.content.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    temperature: f64,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
