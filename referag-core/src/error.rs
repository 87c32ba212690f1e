//! Error type for LLM capability calls.

use thiserror::Error;

/// Errors produced by [`Llm`](crate::Llm) implementations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The request could not be delivered to the provider.
    #[error("LLM transport error ({provider}): {message}")]
    Transport {
        /// The provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The provider answered with a non-success status or a malformed body.
    #[error("LLM provider error ({provider}): {message}")]
    Provider {
        /// The provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The provider configuration is invalid (missing key, bad URL, ...).
    #[error("LLM configuration error: {0}")]
    Config(String),
}
