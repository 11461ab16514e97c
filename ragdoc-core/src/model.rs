//! Language model trait for answer generation.

use async_trait::async_trait;

use crate::error::Result;

/// A language model that completes a prompt in a single synchronous shot.
///
/// No streaming, no retries: retry policy, if any, belongs to the client
/// implementation behind this trait.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion for `prompt` and return its text verbatim.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Model identifier used in logs and error messages.
    fn name(&self) -> &str;
}
