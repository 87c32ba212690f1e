//! Multilingual retrieval orchestration.
//!
//! [`Retriever::search`] widens recall across languages by searching with a
//! small set of query variants (the original query plus, when the corpus
//! language is known and differs, one translation), then merges the
//! per-variant candidate lists into a single ranked result set.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::document::SearchResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::language::{self, LanguageDetector, Translator};
use crate::store::DocumentStore;

/// Orchestrates embed → nearest-neighbor search → merge → filter → rank.
pub struct Retriever {
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    detector: Arc<dyn LanguageDetector>,
    translator: Arc<dyn Translator>,
}

impl Retriever {
    /// Compose a retriever from its collaborators.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        detector: Arc<dyn LanguageDetector>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        Self { store, embedder, detector, translator }
    }

    /// Search the corpus and return at most `limit` results with
    /// `similarity >= min_similarity`, ranked by descending similarity.
    ///
    /// When `document_id` is given, the search is restricted to that
    /// document and its stored language tag becomes the translation target
    /// for the second query variant. Corpus-wide searches have no single
    /// target language and run on the original query alone.
    ///
    /// Each variant over-fetches `2 * limit` candidates to compensate for
    /// the similarity filter. Duplicates across variants are dropped by
    /// chunk identity, first occurrence wins; later variants never re-rank
    /// a chunk already seen.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NotFound`] for an unknown `document_id`. An
    /// embedding or store failure for any variant fails the whole call —
    /// there are no partial results, so the output stays a deterministic
    /// function of the corpus state and the variant list.
    pub async fn search(
        &self,
        query: &str,
        document_id: Option<i64>,
        limit: usize,
        min_similarity: f32,
    ) -> Result<Vec<SearchResult>> {
        let doc_lang = match document_id {
            Some(id) => {
                let record = self
                    .store
                    .get_document(id)
                    .await?
                    .ok_or(RagError::NotFound { document_id: id })?;
                record.metadata.get(crate::document::META_LANGUAGE).cloned()
            }
            None => None,
        };

        let variants = language::expand_query(
            self.detector.as_ref(),
            self.translator.as_ref(),
            query,
            doc_lang.as_deref(),
        )
        .await;

        let mut merged: Vec<SearchResult> = Vec::new();
        let mut seen: HashSet<i64> = HashSet::new();

        for variant in &variants {
            let embedding = self.embedder.embed(variant).await.map_err(|e| {
                error!(error = %e, "query embedding failed");
                e
            })?;
            let candidates =
                self.store.nearest_neighbors(&embedding, document_id, 2 * limit).await?;
            debug!(variant_len = variant.len(), candidates = candidates.len(), "variant searched");

            for candidate in candidates {
                if seen.insert(candidate.chunk_id) {
                    merged.push(candidate);
                }
            }
        }

        // Stable sort: equal-similarity ties keep arrival order.
        merged.sort_by(|a, b| {
            b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal)
        });
        merged.retain(|r| r.similarity >= min_similarity);
        merged.truncate(limit);

        info!(
            variants = variants.len(),
            results = merged.len(),
            min_similarity,
            "search completed"
        );
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::document::{Chunk, META_LANGUAGE};
    use crate::inmemory::InMemoryStore;
    use crate::language::{NoOpTranslator, WhatlangDetector};

    /// Embeds by keyword lookup so tests control similarity exactly.
    struct TableEmbedder {
        table: HashMap<String, Vec<f32>>,
        fallback: Vec<f32>,
    }

    impl TableEmbedder {
        fn new(entries: &[(&str, Vec<f32>)], fallback: Vec<f32>) -> Self {
            let table =
                entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
            Self { table, fallback }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for TableEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(self.table.get(text).cloned().unwrap_or_else(|| self.fallback.clone()))
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    struct EchoTranslator(String);

    #[async_trait]
    impl Translator for EchoTranslator {
        async fn translate(&self, _text: &str, _target_lang: &str) -> Option<String> {
            Some(self.0.clone())
        }
    }

    async fn seed_store(embeddings: &[Vec<f32>]) -> (Arc<InMemoryStore>, i64) {
        let store = Arc::new(InMemoryStore::new());
        let mut metadata = HashMap::new();
        metadata.insert(META_LANGUAGE.to_string(), "eng".to_string());
        let id = store.create_document("doc.txt", 1, metadata).await.unwrap();
        let chunks: Vec<Chunk> = embeddings
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let mut chunk = Chunk::new(i, format!("chunk {i}"));
                chunk.embedding = e.clone();
                chunk
            })
            .collect();
        store.add_chunks(id, &chunks).await.unwrap();
        (store, id)
    }

    fn retriever(
        store: Arc<InMemoryStore>,
        embedder: TableEmbedder,
        translator: impl Translator + 'static,
    ) -> Retriever {
        Retriever::new(store, Arc::new(embedder), Arc::new(WhatlangDetector), Arc::new(translator))
    }

    #[tokio::test]
    async fn results_are_ranked_filtered_and_limited() {
        let (store, id) =
            seed_store(&[vec![1.0, 0.0], vec![0.9, 0.1], vec![0.5, 0.5], vec![0.0, 1.0]]).await;
        let embedder = TableEmbedder::new(&[], vec![1.0, 0.0]);
        let retriever = retriever(store, embedder, NoOpTranslator);

        let results = retriever
            .search("what does the document say about chunks", Some(id), 2, 0.5)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].similarity >= results[1].similarity);
        for r in &results {
            assert!(r.similarity >= 0.5);
        }
    }

    #[tokio::test]
    async fn two_variants_return_each_chunk_at_most_once() {
        let (store, id) = seed_store(&[vec![1.0, 0.0], vec![0.8, 0.2], vec![0.7, 0.3]]).await;
        // Both the French query and its translation embed to the same point,
        // so every chunk matches under both variants.
        let embedder = TableEmbedder::new(&[], vec![1.0, 0.0]);
        let retriever = retriever(store, embedder, EchoTranslator("translated query".into()));

        let results = retriever
            .search("Quelle est la conclusion principale de ce document ?", Some(id), 10, 0.0)
            .await
            .unwrap();

        let mut ids: Vec<i64> = results.iter().map(|r| r.chunk_id).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn below_threshold_corpus_returns_empty_not_error() {
        let (store, id) = seed_store(&[vec![0.5, 0.5]]).await;
        // Best match scores ~0.35 against an off-axis query.
        let embedder = TableEmbedder::new(&[], vec![1.0, -0.8]);
        let retriever = retriever(store, embedder, NoOpTranslator);

        let results = retriever
            .search("unrelated question about something else", Some(id), 5, 0.4)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn unknown_document_is_not_found() {
        let (store, _) = seed_store(&[vec![1.0, 0.0]]).await;
        let embedder = TableEmbedder::new(&[], vec![1.0, 0.0]);
        let retriever = retriever(store, embedder, NoOpTranslator);

        let err = retriever.search("any query at all here", Some(999), 5, 0.0).await.unwrap_err();
        assert!(matches!(err, RagError::NotFound { document_id: 999 }));
    }
}
