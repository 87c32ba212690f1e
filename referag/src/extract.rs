//! Text extraction seam.
//!
//! Format-specific parsing (PDF, DOCX, spreadsheets) is a commodity concern
//! that stays behind this trait; the crate ships a plain-text reader.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{RagError, Result};

/// Extracts ingestable text from an uploaded file.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Read `path` and return its textual content.
    ///
    /// `filename` carries the original upload name for extractors that
    /// dispatch on extension.
    async fn extract(&self, path: &Path, filename: &str) -> Result<String>;
}

/// Reads files as UTF-8 text, replacing invalid sequences.
#[derive(Debug, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    /// Create a plain-text extractor.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path, filename: &str) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| RagError::Extract(format!("failed to read {filename}: {e}")))?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        debug!(filename, bytes = bytes.len(), chars = text.chars().count(), "extracted text");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[tokio::test]
    async fn reads_utf8_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Ein kleiner Text. Ещё немного текста.").unwrap();

        let extractor = PlainTextExtractor::new();
        let text = extractor.extract(file.path(), "doc.txt").await.unwrap();
        assert!(text.contains("kleiner Text"));
        assert!(text.contains("текста"));
    }

    #[tokio::test]
    async fn missing_file_is_an_extract_error() {
        let extractor = PlainTextExtractor::new();
        let err = extractor
            .extract(Path::new("/nonexistent/nowhere.txt"), "nowhere.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::Extract(_)));
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced_not_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[b'o', b'k', 0xFF, 0xFE, b'!']).unwrap();

        let extractor = PlainTextExtractor::new();
        let text = extractor.extract(file.path(), "binaryish.txt").await.unwrap();
        assert!(text.starts_with("ok"));
        assert!(text.ends_with('!'));
    }
}
