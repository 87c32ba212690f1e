//! # referag-core
//!
//! Capability traits shared across the Referag workspace.
//!
//! The central abstraction is [`Llm`]: a single-shot, provider-agnostic text
//! completion. Concrete providers (OpenAI-compatible APIs, Ollama, mocks)
//! live in `referag-model`; the RAG library in `referag` only ever sees
//! `Arc<dyn Llm>`, so backends can be swapped by configuration rather than
//! by conditional branching at call sites.

mod error;
mod llm;

pub use error::LlmError;
pub use llm::Llm;
