//! Artifact rendering seam.
//!
//! PDF rendering is a commodity concern kept behind this trait; the crate
//! ships a Markdown renderer that writes the artifact to disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::error::{RagError, Result};

/// Renders a finished referat into a file artifact.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Write `text` as an artifact for `filename` under `output_dir` and
    /// return the artifact's path.
    async fn render(&self, text: &str, filename: &str, output_dir: &Path) -> Result<PathBuf>;
}

/// Writes the referat as a Markdown file named after the source document.
#[derive(Debug, Default)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    /// Create a Markdown renderer.
    pub fn new() -> Self {
        Self
    }

    fn artifact_name(filename: &str) -> String {
        let stem = Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("referat");
        format!("{stem}_referat.md")
    }
}

#[async_trait]
impl DocumentRenderer for MarkdownRenderer {
    async fn render(&self, text: &str, filename: &str, output_dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| RagError::Render(format!("failed to create output dir: {e}")))?;

        let path = output_dir.join(Self::artifact_name(filename));
        let body = format!(
            "# Referat: {filename}\n\n_Generated {}_\n\n{text}\n",
            Utc::now().format("%Y-%m-%d %H:%M UTC")
        );
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| RagError::Render(format!("failed to write {}: {e}", path.display())))?;

        info!(path = %path.display(), "rendered referat artifact");
        Ok(path)
    }
}
