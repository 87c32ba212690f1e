//! The provider-agnostic text completion trait.

use async_trait::async_trait;

use crate::error::LlmError;

/// A text completion capability.
///
/// One call, one answer: implementations take a system prompt and a user
/// prompt and return the completed text. There is no streaming contract;
/// callers that need progress reporting should layer it on top.
///
/// # Example
///
/// ```rust,ignore
/// use referag_core::Llm;
///
/// let answer = llm.complete("", "Summarize the following ...").await?;
/// ```
#[async_trait]
pub trait Llm: Send + Sync {
    /// A human-readable identifier for the backing model.
    fn name(&self) -> &str;

    /// Complete `prompt` under `system` instructions and return the text.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError>;
}
