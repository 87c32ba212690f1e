//! The service facade tying ingestion, retrieval, and generation together.
//!
//! [`RagService`] composes the storage, embedding, language, and LLM
//! capabilities behind one request/response surface. Collaborators are
//! injected through the builder; nothing here is process-global.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use referag::{InMemoryStore, HashEmbeddings, RagService};
//! use referag_model::OllamaClient;
//!
//! let service = RagService::builder()
//!     .store(Arc::new(InMemoryStore::new()))
//!     .embedder(Arc::new(HashEmbeddings::default()))
//!     .llm(Arc::new(OllamaClient::local("llama3")))
//!     .build()?;
//!
//! let id = service.add_document(path, "report.txt").await?;
//! let answer = service.generate_answer("What does the report conclude?", Some(id)).await?;
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use referag_core::Llm;

use crate::chunking::{BoundaryChunker, Chunker};
use crate::composer::Composer;
use crate::config::RagConfig;
use crate::document::{
    Answer, DocumentRecord, SearchResult, SourceRef, Summary, META_CHUNK_COUNT, META_LANGUAGE,
};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::extract::{PlainTextExtractor, TextExtractor};
use crate::language::{
    self, LanguageDetector, NoOpTranslator, Translator, WhatlangDetector, DOC_LANG_SAMPLE_SIZE,
};
use crate::referat::{ReferatReducer, ReferatStats};
use crate::render::{DocumentRenderer, MarkdownRenderer};
use crate::retrieval::Retriever;
use crate::store::DocumentStore;

/// A rendered referat artifact with its statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferatArtifact {
    /// The source document's identifier.
    pub document_id: i64,
    /// The source document's filename.
    pub filename: String,
    /// The referat text.
    pub text: String,
    /// Path of the rendered artifact.
    pub artifact_path: PathBuf,
    /// Size accounting for the reduction.
    pub stats: ReferatStats,
}

/// The document ingestion, search, and generation service.
pub struct RagService {
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    chunker: Arc<dyn Chunker>,
    detector: Arc<dyn LanguageDetector>,
    extractor: Arc<dyn TextExtractor>,
    renderer: Arc<dyn DocumentRenderer>,
    retriever: Retriever,
    composer: Composer,
    reducer: ReferatReducer,
    config: RagConfig,
}

impl RagService {
    /// Start building a service.
    pub fn builder() -> RagServiceBuilder {
        RagServiceBuilder::default()
    }

    /// Ingest a file: extract, chunk, detect language, embed, store.
    ///
    /// Returns the new document's identifier.
    ///
    /// # Errors
    ///
    /// [`RagError::Validation`] when the file contains no usable text, and
    /// [`RagError::Config`] when the embedding backend returns vectors of a
    /// dimensionality other than its declared one.
    pub async fn add_document(&self, path: &Path, filename: &str) -> Result<i64> {
        let text = self.extractor.extract(path, filename).await?;
        if text.trim().is_empty() {
            return Err(RagError::Validation(format!("{filename} contains no text")));
        }

        let mut chunks = self.chunker.chunk(&text);
        if chunks.is_empty() {
            return Err(RagError::Validation(format!("{filename} produced no chunks")));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let doc_lang =
            language::detect_document_language(self.detector.as_ref(), &texts, DOC_LANG_SAMPLE_SIZE);

        let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let embeddings = self.embedder.embed_batch(&text_refs).await?;
        let expected = self.embedder.dimensions();
        for embedding in &embeddings {
            if embedding.len() != expected {
                return Err(RagError::Config(format!(
                    "embedding backend returned {} dimensions, expected {expected}",
                    embedding.len()
                )));
            }
        }
        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        let file_size = tokio::fs::metadata(path)
            .await
            .map(|m| m.len() as i64)
            .map_err(|e| RagError::Extract(format!("failed to stat {filename}: {e}")))?;

        let mut metadata = HashMap::new();
        metadata.insert(META_CHUNK_COUNT.to_string(), chunks.len().to_string());
        if let Some(lang) = &doc_lang {
            metadata.insert(META_LANGUAGE.to_string(), lang.clone());
        }

        let document_id = self.store.create_document(filename, file_size, metadata).await?;
        self.store.add_chunks(document_id, &chunks).await?;

        info!(
            document_id,
            filename,
            chunks = chunks.len(),
            language = doc_lang.as_deref().unwrap_or("unknown"),
            "document ingested"
        );
        Ok(document_id)
    }

    /// Search with the configured limit and similarity threshold.
    pub async fn search(
        &self,
        query: &str,
        document_id: Option<i64>,
    ) -> Result<Vec<SearchResult>> {
        self.search_with(query, document_id, self.config.search_limit, self.config.min_similarity)
            .await
    }

    /// Search with explicit limit and similarity threshold.
    ///
    /// # Errors
    ///
    /// [`RagError::Validation`] for an empty query, before any external call.
    pub async fn search_with(
        &self,
        query: &str,
        document_id: Option<i64>,
        limit: usize,
        min_similarity: f32,
    ) -> Result<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Err(RagError::Validation("query must not be empty".to_string()));
        }
        self.retriever.search(query, document_id, limit, min_similarity).await
    }

    /// Answer a question from retrieved context.
    pub async fn generate_answer(
        &self,
        query: &str,
        document_id: Option<i64>,
    ) -> Result<Answer> {
        let results = self.search(query, document_id).await?;
        let answer = self.composer.compose_answer(query, &results).await?;
        Ok(Answer {
            answer,
            sources: results.iter().map(SourceRef::from).collect(),
            context: results.into_iter().map(|r| r.content).collect(),
        })
    }

    /// Summarize a stored document.
    ///
    /// # Errors
    ///
    /// [`RagError::NotFound`] for an unknown document.
    pub async fn summarize_document(&self, document_id: i64) -> Result<Summary> {
        let record = self.require_document(document_id).await?;
        let chunks = self.store.get_chunks(document_id).await?;
        let summary = self.composer.compose_summary(&chunks, self.config.summary_char_cap).await?;
        Ok(Summary { document_id, filename: record.filename, summary })
    }

    /// Produce and render a referat for a stored document.
    ///
    /// # Errors
    ///
    /// [`RagError::NotFound`] for an unknown document.
    pub async fn create_referat(
        &self,
        document_id: i64,
        output_dir: &Path,
    ) -> Result<ReferatArtifact> {
        let record = self.require_document(document_id).await?;
        let chunks = self.store.get_chunks(document_id).await?;
        let referat = self.reducer.reduce(&chunks).await?;
        let artifact_path =
            self.renderer.render(&referat.text, &record.filename, output_dir).await?;
        Ok(ReferatArtifact {
            document_id,
            filename: record.filename,
            text: referat.text,
            artifact_path,
            stats: referat.stats,
        })
    }

    /// Fetch one document record.
    ///
    /// # Errors
    ///
    /// [`RagError::NotFound`] for an unknown document.
    pub async fn get_document(&self, document_id: i64) -> Result<DocumentRecord> {
        self.require_document(document_id).await
    }

    /// List all documents, newest first.
    pub async fn list_documents(&self) -> Result<Vec<DocumentRecord>> {
        self.store.list_documents().await
    }

    /// Delete a document and all of its chunks.
    ///
    /// # Errors
    ///
    /// [`RagError::NotFound`] for an unknown document.
    pub async fn delete_document(&self, document_id: i64) -> Result<()> {
        self.require_document(document_id).await?;
        self.store.delete_document(document_id).await?;
        info!(document_id, "document deleted");
        Ok(())
    }

    async fn require_document(&self, document_id: i64) -> Result<DocumentRecord> {
        self.store
            .get_document(document_id)
            .await?
            .ok_or(RagError::NotFound { document_id })
    }
}

/// Builder for [`RagService`].
///
/// Storage, embedding, and LLM backends are required; everything else has a
/// working default.
#[derive(Default)]
pub struct RagServiceBuilder {
    store: Option<Arc<dyn DocumentStore>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    llm: Option<Arc<dyn Llm>>,
    chunker: Option<Arc<dyn Chunker>>,
    detector: Option<Arc<dyn LanguageDetector>>,
    translator: Option<Arc<dyn Translator>>,
    extractor: Option<Arc<dyn TextExtractor>>,
    renderer: Option<Arc<dyn DocumentRenderer>>,
    config: Option<RagConfig>,
}

impl RagServiceBuilder {
    /// Set the document store backend (required).
    pub fn store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the embedding backend (required).
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the LLM backend (required).
    pub fn llm(mut self, llm: Arc<dyn Llm>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Override the chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Override the language detector.
    pub fn detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Set the query translator; defaults to no translation.
    pub fn translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Override the text extractor.
    pub fn extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Override the artifact renderer.
    pub fn renderer(mut self, renderer: Arc<dyn DocumentRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Set the service configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Assemble the service.
    ///
    /// # Errors
    ///
    /// [`RagError::Config`] when a required backend is missing.
    pub fn build(self) -> Result<RagService> {
        let store = self
            .store
            .ok_or_else(|| RagError::Config("document store is required".to_string()))?;
        let embedder = self
            .embedder
            .ok_or_else(|| RagError::Config("embedding backend is required".to_string()))?;
        let llm =
            self.llm.ok_or_else(|| RagError::Config("LLM backend is required".to_string()))?;

        let config = self.config.unwrap_or_default();
        let chunker = self
            .chunker
            .unwrap_or_else(|| Arc::new(BoundaryChunker::new(config.chunk_size, config.chunk_overlap)));
        let detector = self.detector.unwrap_or_else(|| Arc::new(WhatlangDetector));
        let translator = self.translator.unwrap_or_else(|| Arc::new(NoOpTranslator));
        let extractor = self.extractor.unwrap_or_else(|| Arc::new(PlainTextExtractor::new()));
        let renderer = self.renderer.unwrap_or_else(|| Arc::new(MarkdownRenderer::new()));

        let retriever = Retriever::new(
            Arc::clone(&store),
            Arc::clone(&embedder),
            Arc::clone(&detector),
            translator,
        );
        let composer = Composer::new(Arc::clone(&llm));
        let reducer = ReferatReducer::new(llm, &config);

        Ok(RagService {
            store,
            embedder,
            chunker,
            detector,
            extractor,
            renderer,
            retriever,
            composer,
            reducer,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::embedding::HashEmbeddings;
    use crate::inmemory::InMemoryStore;
    use referag_model::MockLlm;

    fn service() -> RagService {
        RagService::builder()
            .store(Arc::new(InMemoryStore::new()))
            .embedder(Arc::new(HashEmbeddings::default()))
            .llm(Arc::new(MockLlm::new("a generated answer")))
            .build()
            .unwrap()
    }

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    #[tokio::test]
    async fn missing_backend_fails_the_builder() {
        let result = RagService::builder()
            .store(Arc::new(InMemoryStore::new()))
            .embedder(Arc::new(HashEmbeddings::default()))
            .build();
        assert!(matches!(result.err(), Some(RagError::Config(_))));
    }

    #[tokio::test]
    async fn add_document_stores_chunks_and_language() {
        let service = service();
        let file = write_temp(
            "The quick brown fox jumps over the lazy dog. \
             This sentence exists so language detection has enough material to work with.",
        );

        let id = service.add_document(file.path(), "fox.txt").await.unwrap();
        let record = service.get_document(id).await.unwrap();
        assert_eq!(record.filename, "fox.txt");
        assert!(record.chunk_count >= 1);
        assert_eq!(record.metadata.get(META_LANGUAGE).map(String::as_str), Some("eng"));
    }

    #[tokio::test]
    async fn empty_file_is_rejected_before_storage() {
        let service = service();
        let file = write_temp("   \n  ");
        let err = service.add_document(file.path(), "blank.txt").await.unwrap_err();
        assert!(matches!(err, RagError::Validation(_)));
        assert!(service.list_documents().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_query_is_rejected_before_search() {
        let service = service();
        let err = service.search("  ", None).await.unwrap_err();
        assert!(matches!(err, RagError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_unknown_document_is_not_found() {
        let service = service();
        let err = service.delete_document(42).await.unwrap_err();
        assert!(matches!(err, RagError::NotFound { document_id: 42 }));
    }

    #[tokio::test]
    async fn delete_removes_document_and_search_results() {
        let service = service();
        let file = write_temp("Some document text that will be indexed and then deleted again.");
        let id = service.add_document(file.path(), "gone.txt").await.unwrap();

        service.delete_document(id).await.unwrap();
        let err = service.get_document(id).await.unwrap_err();
        assert!(matches!(err, RagError::NotFound { .. }));
    }
}
