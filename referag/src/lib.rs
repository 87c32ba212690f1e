//! # referag
//!
//! Multilingual retrieval-augmented generation and document condensation.
//!
//! ## Overview
//!
//! This crate ingests documents into a vector store, answers questions from
//! retrieved context, and condenses whole documents into long-form referats
//! via a hierarchical map-reduce over an LLM. The main pieces:
//!
//! - [`RagService`] - the request/response facade over the whole pipeline
//! - [`BoundaryChunker`] - boundary-aware text splitting
//! - [`Retriever`] - multilingual query expansion and ranked vector search
//! - [`ReferatReducer`] - partition / reduce / merge / frame condensation
//! - [`DocumentStore`] - storage trait with [`InMemoryStore`] and, behind
//!   the `pgvector` feature, [`PgVectorStore`](pgvector::PgVectorStore)
//! - [`EmbeddingProvider`] - embedding trait with [`OpenAiEmbeddings`] and
//!   the offline [`HashEmbeddings`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use referag::{HashEmbeddings, InMemoryStore, RagService};
//! use referag_model::OllamaClient;
//!
//! let service = RagService::builder()
//!     .store(Arc::new(InMemoryStore::new()))
//!     .embedder(Arc::new(HashEmbeddings::default()))
//!     .llm(Arc::new(OllamaClient::local("llama3")))
//!     .build()?;
//!
//! let id = service.add_document(path.as_ref(), "report.txt").await?;
//! let results = service.search("Quelle est la conclusion ?", Some(id)).await?;
//! let answer = service.generate_answer("What changed in 2024?", Some(id)).await?;
//! ```
//!
//! ## Features
//!
//! - `pgvector` - PostgreSQL + pgvector storage backend (sqlx)
//! - `websearch` - DuckDuckGo search with LLM summarization (scraper)
//! - `full` - everything above

pub mod chunking;
pub mod composer;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod inmemory;
pub mod language;
pub mod openai;
pub mod referat;
pub mod render;
pub mod retrieval;
pub mod service;
pub mod store;

#[cfg(feature = "pgvector")]
pub mod pgvector;

#[cfg(feature = "websearch")]
pub mod websearch;

pub use chunking::{split_text, BoundaryChunker, Chunker};
pub use composer::{Composer, NO_RELEVANT_INFO};
pub use config::{LlmProvider, RagConfig, ServiceSettings};
pub use document::{
    Answer, Chunk, DocumentRecord, SearchResult, SourceRef, Summary, META_CHUNK_COUNT,
    META_LANGUAGE, META_LENGTH,
};
pub use embedding::{EmbeddingProvider, HashEmbeddings};
pub use error::{RagError, Result};
pub use extract::{PlainTextExtractor, TextExtractor};
pub use inmemory::InMemoryStore;
pub use language::{
    detect_document_language, expand_query, should_translate, HttpTranslator, LanguageDetector,
    NoOpTranslator, Translator, WhatlangDetector,
};
pub use openai::OpenAiEmbeddings;
pub use referat::{Referat, ReferatReducer, ReferatStats, NO_TEXT_DATA};
pub use render::{DocumentRenderer, MarkdownRenderer};
pub use retrieval::Retriever;
pub use service::{RagService, RagServiceBuilder, ReferatArtifact};
pub use store::DocumentStore;

#[cfg(feature = "pgvector")]
pub use pgvector::PgVectorStore;

#[cfg(feature = "websearch")]
pub use websearch::{WebSearchAnswer, WebSearchResult, WebSearcher, NO_WEB_RESULTS};
