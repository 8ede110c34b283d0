//! Chat proxy providers
//!
//! Exactly one provider answers chat requests, selected once from static
//! configuration. Request content never influences the choice.

mod echo;
mod gateway;
mod openai;

pub use echo::EchoProvider;
pub use gateway::{GatewayProvider, extract_reply};
pub use openai::OpenAiChatProvider;

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::config::{ChatConfig, ChatProviderKind};

/// Source label used when the caller does not send one
pub const DEFAULT_SOURCE: &str = "pitboy-watch";

/// Reply used when an upstream succeeds without usable content
pub const NO_RESPONSE: &str = "No response";

/// Trait for chat reply providers
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Produce a reply for one utterance
    ///
    /// # Errors
    ///
    /// Returns error if the provider is misconfigured or the upstream fails
    async fn generate(&self, text: &str, source: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Build the configured chat provider
#[must_use]
pub fn from_config(config: &ChatConfig, client: reqwest::Client) -> Arc<dyn ChatProvider> {
    let provider: Arc<dyn ChatProvider> = match config.provider {
        ChatProviderKind::Echo => Arc::new(EchoProvider),
        ChatProviderKind::PrimaryChat => Arc::new(OpenAiChatProvider::new(client, config)),
        ChatProviderKind::AlternateGateway => Arc::new(GatewayProvider::new(client, config)),
    };
    tracing::info!(provider = provider.name(), "chat provider selected");
    provider
}
