//! Text generation trait for answer synthesis.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that generates text from a prompt.
///
/// The query engine hands implementations a fully assembled grounding
/// prompt; the provider returns the model's answer text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// A short name for the provider, used in logs and error messages.
    fn name(&self) -> &str;
}
