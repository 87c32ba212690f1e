//! # referag-model
//!
//! LLM provider implementations for Referag.
//!
//! ## Overview
//!
//! Every provider implements [`referag_core::Llm`], the single-shot text
//! completion trait. Currently supported:
//!
//! - [`OpenAiChat`] — OpenAI chat completions and any OpenAI-compatible API
//!   (hosted gateways, vLLM, LM Studio, ...) via a custom base URL
//! - [`OllamaClient`] — local models served by Ollama
//! - [`MockLlm`] — scripted responses for tests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use referag_model::OpenAiChat;
//!
//! let api_key = std::env::var("OPENAI_API_KEY").unwrap();
//! let llm = OpenAiChat::new(api_key, "gpt-4o-mini")?;
//! let text = llm.complete("", "Say hello").await?;
//! ```
//!
//! Providers are selected by configuration (see `referag::config`), never by
//! branching at call sites: consumers hold an `Arc<dyn Llm>`.

pub mod mock;
pub mod ollama;
pub mod openai;

pub use mock::MockLlm;
pub use ollama::OllamaClient;
pub use openai::OpenAiChat;
