//! Embedding provider trait.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that turns text into fixed-dimensionality vectors.
///
/// The dimensionality reported by [`dimensions`](EmbeddingProvider::dimensions)
/// is constant for the lifetime of the provider and must match the stored
/// corpus; a mismatch is a configuration error, not a per-call error.
/// The default [`embed_batch`](EmbeddingProvider::embed_batch) calls
/// [`embed`](EmbeddingProvider::embed) sequentially; backends with native
/// batching should override it.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// The dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}

/// A deterministic, offline [`EmbeddingProvider`] for development and tests.
///
/// Hashes character n-grams into a fixed number of buckets and L2-normalizes
/// the result. Not a semantic embedding — similar strings score high, which
/// is exactly what pipeline tests need without a model server.
#[derive(Debug, Clone)]
pub struct HashEmbeddings {
    dimensions: usize,
}

impl HashEmbeddings {
    /// Create a provider emitting vectors of `dimensions` buckets.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl Default for HashEmbeddings {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimensions];
        let chars: Vec<char> = text.to_lowercase().chars().collect();
        for window in chars.windows(3) {
            let mut hash: u64 = 1469598103934665603;
            for c in window {
                hash ^= *c as u64;
                hash = hash.wrapping_mul(1099511628211);
            }
            vector[(hash % self.dimensions as u64) as usize] += 1.0;
        }
        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_embeddings_are_deterministic_and_normalized() {
        let provider = HashEmbeddings::new(32);
        let a = provider.embed("the cat sat on the mat").await.unwrap();
        let b = provider.embed("the cat sat on the mat").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        let norm: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn default_batch_embeds_sequentially() {
        let provider = HashEmbeddings::new(16);
        let batch = provider.embed_batch(&["one", "two", "three"]).await.unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0], provider.embed("one").await.unwrap());
    }
}
