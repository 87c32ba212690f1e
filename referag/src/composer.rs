//! Prompt assembly for answers and summaries.
//!
//! Builds structured instruction-following prompts around numbered,
//! attributed context blocks and delegates to the [`Llm`] capability.

use std::sync::Arc;

use tracing::{debug, info};

use referag_core::Llm;

use crate::document::{Chunk, SearchResult};
use crate::error::Result;

/// Fixed response when retrieval produced nothing usable.
pub const NO_RELEVANT_INFO: &str = "No relevant information was found in the documents.";

/// Marker appended when summary input had to be cut at the character cap.
const TRUNCATION_MARKER: &str = "\n\n[... input truncated ...]";

/// Assembles prompts and delegates to the LLM.
pub struct Composer {
    llm: Arc<dyn Llm>,
}

impl Composer {
    /// Create a composer for the given LLM.
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self { llm }
    }

    /// Answer `query` from ranked `results`.
    ///
    /// Short-circuits to [`NO_RELEVANT_INFO`] without an LLM call when
    /// `results` is empty.
    pub async fn compose_answer(&self, query: &str, results: &[SearchResult]) -> Result<String> {
        if results.is_empty() {
            info!("no context available, skipping LLM call");
            return Ok(NO_RELEVANT_INFO.to_string());
        }

        let context = results
            .iter()
            .enumerate()
            .map(|(i, r)| format!("[Source {} - {}]:\n{}", i + 1, r.filename, r.content))
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = format!(
            "Answer the user's question from the context below.\n\
             \n\
             ANSWER REQUIREMENTS:\n\
             1. Structure the answer with headings and subheadings\n\
             2. Use numbered lists for enumerations\n\
             3. Mark key terms in bold (**term**)\n\
             4. Open with a one-to-two sentence summary\n\
             5. Group related information into logical sections\n\
             6. If the context is insufficient, state clearly what is known and what is missing\n\
             7. Use only information from the context, add nothing of your own\n\
             \n\
             CONTEXT:\n\
             {context}\n\
             \n\
             QUESTION: {query}\n\
             \n\
             ANSWER:"
        );

        debug!(context_len = context.len(), prompt_len = prompt.len(), "composed answer prompt");
        Ok(self.llm.complete("", &prompt).await?)
    }

    /// Summarize a document from its ordered chunks.
    ///
    /// The concatenated chunk text is capped at `char_cap` characters with
    /// an explicit truncation marker, bounding the prompt regardless of
    /// document length. Empty chunk lists short-circuit to
    /// [`NO_RELEVANT_INFO`] without an LLM call.
    pub async fn compose_summary(&self, chunks: &[Chunk], char_cap: usize) -> Result<String> {
        if chunks.is_empty() {
            info!("document has no chunks, skipping LLM call");
            return Ok(NO_RELEVANT_INFO.to_string());
        }

        let full_text =
            chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join("\n\n");
        let text = if full_text.chars().count() > char_cap {
            let mut capped: String = full_text.chars().take(char_cap).collect();
            capped.push_str(TRUNCATION_MARKER);
            debug!(cap = char_cap, original = full_text.chars().count(), "summary input truncated");
            capped
        } else {
            full_text
        };

        let prompt = format!(
            "Write a concise summary of the document below.\n\
             \n\
             SUMMARY REQUIREMENTS:\n\
             1. Open with the document's purpose in one sentence\n\
             2. Cover the main topics in the order they appear\n\
             3. Keep the summary under 300 words\n\
             4. Use only information from the document\n\
             \n\
             DOCUMENT:\n\
             {text}\n\
             \n\
             SUMMARY:"
        );

        Ok(self.llm.complete("", &prompt).await?)
    }
}
