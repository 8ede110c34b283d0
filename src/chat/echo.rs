//! Offline echo provider

use async_trait::async_trait;

use super::ChatProvider;
use crate::Result;

/// Marker prepended to every echoed utterance
pub const ECHO_PREFIX: &str = "ECHO: ";

/// Returns the input unchanged behind a fixed marker
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoProvider;

#[async_trait]
impl ChatProvider for EchoProvider {
    async fn generate(&self, text: &str, _source: &str) -> Result<String> {
        Ok(format!("{ECHO_PREFIX}{text}"))
    }

    fn name(&self) -> &'static str {
        "echo"
    }
}
