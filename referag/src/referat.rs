//! Hierarchical referat reducer.
//!
//! Condenses a document of unbounded length into a single long-form
//! restatement without ever exceeding what one LLM call can process.
//! The pipeline is a small state machine per document:
//!
//! 1. **Partition** — pack ordered chunks greedily into parts bounded by a
//!    character threshold; a part never splits a chunk.
//! 2. **Reduce** — one LLM call per part, condensing to a target word-count
//!    band (advisory, logged when missed).
//! 3. **Merge** — while more than one part remains, merge groups of bounded
//!    size with one LLM call per group; size-1 groups pass through. Fan-in
//!    per call stays bounded, giving logarithmically many levels.
//! 4. **Frame** — one final LLM call wraps the single remaining part with an
//!    introduction and conclusion. Skipped when the document reduced to a
//!    single leaf part: the leaf output is returned unframed. That branch
//!    asymmetry is intentional and load-bearing for callers.

use std::sync::Arc;

use tracing::{debug, info, warn};

use referag_core::Llm;

use crate::config::RagConfig;
use crate::document::Chunk;
use crate::error::Result;

/// Fixed response for a document with no chunk text.
pub const NO_TEXT_DATA: &str = "The document contains no textual data.";

/// An intermediate reduction product; consumed when merged into its parent.
#[derive(Debug, Clone)]
struct ReferatPart {
    text: String,
    source_words: usize,
}

/// Size accounting for a completed referat.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReferatStats {
    /// Character count of the source text.
    pub original_chars: usize,
    /// Word count of the source text.
    pub original_words: usize,
    /// Word count of the final referat.
    pub final_words: usize,
    /// `final_words / original_words`, 0.0 for empty input.
    pub compression_ratio: f32,
}

/// The final referat text with its statistics.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Referat {
    /// The condensed document text.
    pub text: String,
    /// Size accounting for the run.
    pub stats: ReferatStats,
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Runs the partition → reduce → merge → frame pipeline.
pub struct ReferatReducer {
    llm: Arc<dyn Llm>,
    part_chars: usize,
    merge_group: usize,
    compression_min: f32,
    compression_max: f32,
    language: Option<String>,
}

impl ReferatReducer {
    /// Build a reducer from the LLM capability and tuning knobs in `config`.
    pub fn new(llm: Arc<dyn Llm>, config: &RagConfig) -> Self {
        Self {
            llm,
            part_chars: config.referat_part_chars,
            merge_group: config.referat_merge_group,
            compression_min: config.referat_compression_min,
            compression_max: config.referat_compression_max,
            language: config.referat_language.clone(),
        }
    }

    /// Produce a referat from a document's ordered chunks.
    ///
    /// Returns the fixed [`NO_TEXT_DATA`] message without any LLM call when
    /// the chunks carry no text.
    pub async fn reduce(&self, chunks: &[Chunk]) -> Result<Referat> {
        let source: Vec<&str> =
            chunks.iter().map(|c| c.text.as_str()).filter(|t| !t.trim().is_empty()).collect();
        if source.is_empty() {
            info!("document has no textual data, skipping referat");
            return Ok(Referat {
                text: NO_TEXT_DATA.to_string(),
                stats: ReferatStats {
                    original_chars: 0,
                    original_words: 0,
                    final_words: 0,
                    compression_ratio: 0.0,
                },
            });
        }

        let original_chars: usize = source.iter().map(|t| t.chars().count()).sum();
        let original_words: usize = source.iter().map(|t| word_count(t)).sum();

        let parts = self.partition(&source);
        let leaf_count = parts.len();
        info!(leaf_count, original_chars, original_words, "partitioned document");

        let mut reduced = Vec::with_capacity(leaf_count);
        for (i, part) in parts.iter().enumerate() {
            reduced.push(self.reduce_part(i, part).await?);
        }

        // A single leaf part is returned as the leaf reduction output,
        // without the intro/conclusion framing applied to merged documents.
        let text = if leaf_count == 1 {
            reduced.remove(0).text
        } else {
            let merged = self.merge_all(reduced).await?;
            self.frame(&merged.text).await?
        };

        let final_words = word_count(&text);
        let compression_ratio = if original_words == 0 {
            0.0
        } else {
            final_words as f32 / original_words as f32
        };
        info!(final_words, compression_ratio, "referat complete");

        Ok(Referat {
            text,
            stats: ReferatStats { original_chars, original_words, final_words, compression_ratio },
        })
    }

    /// Greedy packing of ordered chunk texts into character-bounded parts.
    ///
    /// A chunk longer than the threshold becomes a part of its own rather
    /// than being split.
    fn partition(&self, texts: &[&str]) -> Vec<String> {
        let mut parts = Vec::new();
        let mut current = String::new();
        let mut current_chars = 0usize;

        for text in texts {
            let chars = text.chars().count();
            if current_chars > 0 && current_chars + chars > self.part_chars {
                parts.push(std::mem::take(&mut current));
                current_chars = 0;
            }
            if !current.is_empty() {
                current.push_str("\n\n");
            }
            current.push_str(text);
            current_chars += chars;
        }
        if !current.is_empty() {
            parts.push(current);
        }
        parts
    }

    async fn reduce_part(&self, index: usize, part: &str) -> Result<ReferatPart> {
        let source_words = word_count(part);
        let min_words = (source_words as f32 * self.compression_min).round() as usize;
        let max_words = (source_words as f32 * self.compression_max).round() as usize;

        let language_clause = match &self.language {
            Some(lang) => format!("Write the condensed text in {lang}.\n"),
            None => String::new(),
        };
        let prompt = format!(
            "Condense the text below into a detailed restatement.\n\
             \n\
             HARD CONSTRAINTS:\n\
             1. The output MUST be between {min_words} and {max_words} words \
             ({}%-{}% of the original {source_words} words)\n\
             2. Preserve the structure and order of the original\n\
             3. Keep all key facts, figures, and terminology\n\
             4. Remove repetition and filler only\n\
             {language_clause}\
             \n\
             TEXT:\n\
             {part}\n\
             \n\
             CONDENSED TEXT:",
            (self.compression_min * 100.0).round() as u32,
            (self.compression_max * 100.0).round() as u32,
        );

        let text = self.llm.complete("", &prompt).await?;
        let actual = word_count(&text);
        if actual < min_words || actual > max_words {
            warn!(
                part = index,
                source_words,
                actual,
                min_words,
                max_words,
                "part reduction outside target band"
            );
        } else {
            debug!(part = index, source_words, actual, "part reduced");
        }
        Ok(ReferatPart { text, source_words })
    }

    /// Merge parts level by level until one remains, order preserved.
    async fn merge_all(&self, mut parts: Vec<ReferatPart>) -> Result<ReferatPart> {
        let mut level = 0usize;
        while parts.len() > 1 {
            level += 1;
            let groups: Vec<&[ReferatPart]> = parts.chunks(self.merge_group).collect();
            debug!(level, parts = parts.len(), groups = groups.len(), "merging level");

            let mut next = Vec::with_capacity(groups.len());
            for group in groups {
                if group.len() == 1 {
                    next.push(group[0].clone());
                } else {
                    next.push(self.merge_parts(group).await?);
                }
            }
            parts = next;
        }
        // Loop invariant: parts is never empty here.
        Ok(parts.remove(0))
    }

    async fn merge_parts(&self, group: &[ReferatPart]) -> Result<ReferatPart> {
        let combined_words: usize = group.iter().map(|p| word_count(&p.text)).sum();
        let keep_words = (combined_words as f32 * 0.85).round() as usize;
        let sections = group
            .iter()
            .enumerate()
            .map(|(i, p)| format!("--- SECTION {} ---\n{}", i + 1, p.text))
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = format!(
            "Join the consecutive sections below into one continuous text.\n\
             \n\
             HARD CONSTRAINTS:\n\
             1. Keep the sections in their given order\n\
             2. Add only short transitions between sections\n\
             3. Remove only sentences that are exact duplicates\n\
             4. Preserve at least {keep_words} of the {combined_words} combined words\n\
             \n\
             {sections}\n\
             \n\
             JOINED TEXT:"
        );

        let text = self.llm.complete("", &prompt).await?;
        let source_words = group.iter().map(|p| p.source_words).sum();
        Ok(ReferatPart { text, source_words })
    }

    async fn frame(&self, body: &str) -> Result<String> {
        let prompt = format!(
            "Add an introduction and a conclusion to the text below.\n\
             \n\
             HARD CONSTRAINTS:\n\
             1. Prepend an introduction of roughly 150-200 words\n\
             2. Append a conclusion of roughly 150-200 words\n\
             3. Reproduce the body between them exactly as given\n\
             \n\
             TEXT:\n\
             {body}\n\
             \n\
             FRAMED TEXT:"
        );
        Ok(self.llm.complete("", &prompt).await?)
    }
}
