//! Document store trait: persistence plus nearest-neighbor search.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::document::{Chunk, DocumentRecord, SearchResult};
use crate::error::Result;

/// A storage backend owning documents, their chunks, and the vector index.
///
/// Documents aggregate chunks; deleting a document cascades to its chunks.
/// There is no update-in-place: chunk content and embeddings are written
/// once at ingestion and only ever read or deleted afterwards.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document record and return its assigned ID.
    async fn create_document(
        &self,
        filename: &str,
        file_size: i64,
        metadata: HashMap<String, String>,
    ) -> Result<i64>;

    /// Bulk-insert chunks for a document. Chunks must carry embeddings.
    async fn add_chunks(&self, document_id: i64, chunks: &[Chunk]) -> Result<()>;

    /// Rank the `limit` nearest chunks to `embedding` by similarity,
    /// optionally restricted to one document.
    ///
    /// Results come back ordered by descending similarity, scores in
    /// `[0, 1]`.
    async fn nearest_neighbors(
        &self,
        embedding: &[f32],
        document_id: Option<i64>,
        limit: usize,
    ) -> Result<Vec<SearchResult>>;

    /// Fetch one document record, or `None` if it does not exist.
    async fn get_document(&self, document_id: i64) -> Result<Option<DocumentRecord>>;

    /// List all documents, newest first.
    async fn list_documents(&self) -> Result<Vec<DocumentRecord>>;

    /// Delete a document and, cascading, all of its chunks.
    async fn delete_document(&self, document_id: i64) -> Result<()>;

    /// Fetch a document's chunks ordered by their index.
    async fn get_chunks(&self, document_id: i64) -> Result<Vec<Chunk>>;
}
