//! Error types for the `referag` crate.

use thiserror::Error;

/// Errors that can occur in RAG operations.
///
/// Language detection and translation failures never appear here: both fail
/// soft and callers fall back to the untranslated path (see
/// [`language`](crate::language)).
#[derive(Debug, Error)]
pub enum RagError {
    /// The referenced document does not exist.
    #[error("document {document_id} not found")]
    NotFound {
        /// The document ID that was looked up.
        document_id: i64,
    },

    /// The request was rejected before any external call was made.
    #[error("validation error: {0}")]
    Validation(String),

    /// An error occurred during embedding generation.
    #[error("embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the document store backend.
    #[error("store error ({backend}): {message}")]
    Store {
        /// The store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An error propagated from the LLM capability.
    #[error(transparent)]
    Llm(#[from] referag_core::LlmError),

    /// An error occurred while extracting text from an uploaded file.
    #[error("extraction error: {0}")]
    Extract(String),

    /// An error occurred while rendering an output artifact.
    #[error("render error: {0}")]
    Render(String),

    /// A configuration validation error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An error in pipeline orchestration.
    #[error("pipeline error: {0}")]
    Pipeline(String),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
