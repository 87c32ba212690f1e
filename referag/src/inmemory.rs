//! In-memory document store using cosine similarity.
//!
//! A zero-dependency [`DocumentStore`] backed by `HashMap`s behind a
//! `tokio::sync::RwLock`. Suitable for development and tests; the production
//! backend is [`PgVectorStore`](crate::pgvector::PgVectorStore).

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::document::{Chunk, DocumentRecord, SearchResult};
use crate::error::{RagError, Result};
use crate::store::DocumentStore;

#[derive(Debug, Clone)]
struct StoredChunk {
    id: i64,
    document_id: i64,
    chunk: Chunk,
}

#[derive(Debug, Default)]
struct State {
    documents: HashMap<i64, DocumentRecord>,
    chunks: Vec<StoredChunk>,
    next_document_id: i64,
    next_chunk_id: i64,
}

/// An in-memory [`DocumentStore`] with cosine-similarity search.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn missing(document_id: i64) -> RagError {
        RagError::Store {
            backend: "InMemory".to_string(),
            message: format!("document {document_id} does not exist"),
        }
    }
}

/// Cosine similarity of two vectors; 0.0 when either has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn create_document(
        &self,
        filename: &str,
        file_size: i64,
        metadata: HashMap<String, String>,
    ) -> Result<i64> {
        let mut state = self.state.write().await;
        state.next_document_id += 1;
        let id = state.next_document_id;
        state.documents.insert(
            id,
            DocumentRecord {
                id,
                filename: filename.to_string(),
                file_size,
                uploaded_at: Utc::now(),
                metadata,
                chunk_count: 0,
            },
        );
        Ok(id)
    }

    async fn add_chunks(&self, document_id: i64, chunks: &[Chunk]) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.documents.contains_key(&document_id) {
            return Err(Self::missing(document_id));
        }
        for chunk in chunks {
            state.next_chunk_id += 1;
            let id = state.next_chunk_id;
            state.chunks.push(StoredChunk { id, document_id, chunk: chunk.clone() });
        }
        if let Some(record) = state.documents.get_mut(&document_id) {
            record.chunk_count += chunks.len() as i64;
        }
        Ok(())
    }

    async fn nearest_neighbors(
        &self,
        embedding: &[f32],
        document_id: Option<i64>,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let state = self.state.read().await;
        let mut scored: Vec<SearchResult> = state
            .chunks
            .iter()
            .filter(|stored| document_id.is_none_or(|id| stored.document_id == id))
            .map(|stored| {
                let similarity =
                    cosine_similarity(&stored.chunk.embedding, embedding).clamp(0.0, 1.0);
                let filename = state
                    .documents
                    .get(&stored.document_id)
                    .map(|d| d.filename.clone())
                    .unwrap_or_default();
                SearchResult {
                    chunk_id: stored.id,
                    document_id: stored.document_id,
                    filename,
                    content: stored.chunk.text.clone(),
                    chunk_index: stored.chunk.index,
                    similarity,
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);
        Ok(scored)
    }

    async fn get_document(&self, document_id: i64) -> Result<Option<DocumentRecord>> {
        let state = self.state.read().await;
        Ok(state.documents.get(&document_id).cloned())
    }

    async fn list_documents(&self) -> Result<Vec<DocumentRecord>> {
        let state = self.state.read().await;
        let mut documents: Vec<DocumentRecord> = state.documents.values().cloned().collect();
        documents.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(b.id.cmp(&a.id)));
        Ok(documents)
    }

    async fn delete_document(&self, document_id: i64) -> Result<()> {
        let mut state = self.state.write().await;
        if state.documents.remove(&document_id).is_none() {
            return Err(Self::missing(document_id));
        }
        state.chunks.retain(|stored| stored.document_id != document_id);
        Ok(())
    }

    async fn get_chunks(&self, document_id: i64) -> Result<Vec<Chunk>> {
        let state = self.state.read().await;
        let mut chunks: Vec<Chunk> = state
            .chunks
            .iter()
            .filter(|stored| stored.document_id == document_id)
            .map(|stored| stored.chunk.clone())
            .collect();
        chunks.sort_by_key(|c| c.index);
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(index: usize, text: &str, embedding: Vec<f32>) -> Chunk {
        let mut chunk = Chunk::new(index, text);
        chunk.embedding = embedding;
        chunk
    }

    #[tokio::test]
    async fn create_and_fetch_document() {
        let store = InMemoryStore::new();
        let id = store.create_document("a.txt", 42, HashMap::new()).await.unwrap();
        let record = store.get_document(id).await.unwrap().unwrap();
        assert_eq!(record.filename, "a.txt");
        assert_eq!(record.file_size, 42);
        assert_eq!(record.chunk_count, 0);
        assert!(store.get_document(id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn chunk_count_tracks_insertions() {
        let store = InMemoryStore::new();
        let id = store.create_document("a.txt", 1, HashMap::new()).await.unwrap();
        store
            .add_chunks(id, &[chunk(0, "one", vec![1.0, 0.0]), chunk(1, "two", vec![0.0, 1.0])])
            .await
            .unwrap();
        assert_eq!(store.get_document(id).await.unwrap().unwrap().chunk_count, 2);
    }

    #[tokio::test]
    async fn nearest_neighbors_ranks_by_similarity() {
        let store = InMemoryStore::new();
        let id = store.create_document("a.txt", 1, HashMap::new()).await.unwrap();
        store
            .add_chunks(
                id,
                &[
                    chunk(0, "exact", vec![1.0, 0.0]),
                    chunk(1, "orthogonal", vec![0.0, 1.0]),
                    chunk(2, "close", vec![0.9, 0.1]),
                ],
            )
            .await
            .unwrap();

        let results = store.nearest_neighbors(&[1.0, 0.0], None, 10).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].content, "exact");
        assert_eq!(results[1].content, "close");
        assert!(results[0].similarity >= results[1].similarity);
        assert!((results[0].similarity - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn nearest_neighbors_respects_document_filter_and_limit() {
        let store = InMemoryStore::new();
        let a = store.create_document("a.txt", 1, HashMap::new()).await.unwrap();
        let b = store.create_document("b.txt", 1, HashMap::new()).await.unwrap();
        store.add_chunks(a, &[chunk(0, "in a", vec![1.0, 0.0])]).await.unwrap();
        store.add_chunks(b, &[chunk(0, "in b", vec![1.0, 0.0])]).await.unwrap();

        let results = store.nearest_neighbors(&[1.0, 0.0], Some(b), 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].filename, "b.txt");

        let limited = store.nearest_neighbors(&[1.0, 0.0], None, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn delete_cascades_to_chunks() {
        let store = InMemoryStore::new();
        let id = store.create_document("a.txt", 1, HashMap::new()).await.unwrap();
        store.add_chunks(id, &[chunk(0, "text", vec![1.0])]).await.unwrap();
        store.delete_document(id).await.unwrap();
        assert!(store.get_document(id).await.unwrap().is_none());
        assert!(store.nearest_neighbors(&[1.0], None, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_chunks_returns_index_order() {
        let store = InMemoryStore::new();
        let id = store.create_document("a.txt", 1, HashMap::new()).await.unwrap();
        store
            .add_chunks(
                id,
                &[chunk(2, "c", vec![1.0]), chunk(0, "a", vec![1.0]), chunk(1, "b", vec![1.0])],
            )
            .await
            .unwrap();
        let chunks = store.get_chunks(id).await.unwrap();
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }
}
