//! Data types for documents, chunks, and search results.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata key under which the detected document language is stored.
pub const META_LANGUAGE: &str = "language";

/// Metadata key under which the chunk count is stored on a document.
pub const META_CHUNK_COUNT: &str = "chunk_count";

/// Metadata key recording a chunk's content length in characters.
pub const META_LENGTH: &str = "length";

/// A stored document: identity, file facts, and free-form metadata.
///
/// Immutable after creation except for deletion, which cascades to the
/// document's chunks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentRecord {
    /// Storage-assigned identifier.
    pub id: i64,
    /// Original filename of the upload.
    pub filename: String,
    /// Size of the uploaded file in bytes.
    pub file_size: i64,
    /// Upload timestamp.
    pub uploaded_at: DateTime<Utc>,
    /// Free-form metadata; includes the detected language and chunk count.
    pub metadata: HashMap<String, String>,
    /// Number of chunks stored for this document.
    pub chunk_count: i64,
}

/// A contiguous slice of a document's text with its embedding.
///
/// Chunk indexes are 0-based, gap-free, and monotonic within a document;
/// they define document order. Embedding dimensionality is constant across
/// the whole corpus — a mismatch is a configuration error, not a per-call
/// error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// 0-based position of this chunk within its document.
    pub index: usize,
    /// The chunk text. Non-empty after boundary trimming.
    pub text: String,
    /// The embedding vector for this chunk's text.
    pub embedding: Vec<f32>,
    /// Chunk metadata; at minimum the content length.
    pub metadata: HashMap<String, String>,
}

impl Chunk {
    /// Build a chunk from its index and text, filling in length metadata.
    ///
    /// The embedding starts empty and is attached later by the pipeline.
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        let mut metadata = HashMap::new();
        metadata.insert(META_LENGTH.to_string(), text.chars().count().to_string());
        Self { index, text, embedding: Vec::new(), metadata }
    }
}

/// A retrieved chunk paired with its owning document and a similarity score.
///
/// Ephemeral: produced by a query, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Storage-assigned chunk identifier. Dedup key across query variants.
    pub chunk_id: i64,
    /// The owning document's identifier.
    pub document_id: i64,
    /// The owning document's filename.
    pub filename: String,
    /// The chunk text.
    pub content: String,
    /// The chunk's 0-based position within its document.
    pub chunk_index: usize,
    /// Similarity score in `[0, 1]` where 1 means identical.
    pub similarity: f32,
}

/// Attribution for one retrieved chunk used in an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    /// The owning document's filename.
    pub filename: String,
    /// The owning document's identifier.
    pub document_id: i64,
    /// The chunk's 0-based position within its document.
    pub chunk_index: usize,
    /// Similarity score of the retrieved chunk.
    pub similarity: f32,
}

impl From<&SearchResult> for SourceRef {
    fn from(result: &SearchResult) -> Self {
        Self {
            filename: result.filename.clone(),
            document_id: result.document_id,
            chunk_index: result.chunk_index,
            similarity: result.similarity,
        }
    }
}

/// A generated answer together with its source attributions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// The answer text.
    pub answer: String,
    /// Attributions for the chunks that informed the answer.
    pub sources: Vec<SourceRef>,
    /// The raw context texts, in ranked order.
    pub context: Vec<String>,
}

/// A generated document summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// The summarized document's identifier.
    pub document_id: i64,
    /// The summarized document's filename.
    pub filename: String,
    /// The summary text.
    pub summary: String,
}
