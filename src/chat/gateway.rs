//! Alternate chat gateway provider
//!
//! Posts `{text, source, channel}` to a configured URL. The gateway may answer
//! with JSON or plain text; [`extract_reply`] normalizes both.

use async_trait::async_trait;
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;

use super::{ChatProvider, DEFAULT_SOURCE, NO_RESPONSE};
use crate::config::ChatConfig;
use crate::{Error, Result};

/// Fields checked for a reply, in priority order
const REPLY_FIELDS: [&str; 3] = ["reply", "message", "text"];

/// Forwards utterances to an external chat gateway
pub struct GatewayProvider {
    client: Client,
    url: Option<String>,
    token: Option<SecretString>,
}

impl GatewayProvider {
    /// Create a new gateway provider
    #[must_use]
    pub fn new(client: Client, config: &ChatConfig) -> Self {
        Self {
            client,
            url: config.gateway_url.clone(),
            token: config
                .gateway_token
                .as_ref()
                .map(|t| SecretString::from(t.expose_secret().to_owned())),
        }
    }
}

#[derive(Serialize)]
struct GatewayRequest<'a> {
    text: &'a str,
    source: &'a str,
    channel: &'static str,
}

#[async_trait]
impl ChatProvider for GatewayProvider {
    async fn generate(&self, text: &str, source: &str) -> Result<String> {
        let url = self
            .url
            .as_deref()
            .ok_or_else(|| Error::Upstream("OPENCLAW_CHAT_URL missing".to_string()))?;

        let mut request = self.client.post(url).json(&GatewayRequest {
            text,
            source,
            channel: DEFAULT_SOURCE,
        });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!("gateway error: {status} {body}")));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        let body = response.text().await?;

        Ok(extract_reply(content_type.as_deref(), &body))
    }

    fn name(&self) -> &'static str {
        "alternate-gateway"
    }
}

/// Normalize a gateway response body into a reply string
///
/// JSON bodies yield the first non-empty string among `reply`, `message` and
/// `text`, else the whole document re-serialized. Anything else is returned
/// verbatim.
#[must_use]
pub fn extract_reply(content_type: Option<&str>, body: &str) -> String {
    let is_json = content_type.is_some_and(|ct| ct.contains("application/json"));

    if is_json {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => return reply_from_json(&value),
            Err(e) => {
                tracing::warn!(error = %e, "gateway declared JSON but body did not parse");
            }
        }
    }

    if body.is_empty() {
        NO_RESPONSE.to_string()
    } else {
        body.to_string()
    }
}

fn reply_from_json(value: &Value) -> String {
    REPLY_FIELDS
        .iter()
        .find_map(|field| {
            value
                .get(*field)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })
        .map_or_else(|| value.to_string(), ToString::to_string)
}
