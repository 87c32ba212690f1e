//! Boundary-aware document chunking.
//!
//! [`split_text`] advances a fixed-size character window over the text. When
//! the window's right edge falls inside the text, it snaps backward to the
//! nearest preceding sentence boundary (`.`), newline, or space — whichever
//! lies closest to the window end — provided that boundary is strictly after
//! the window start. Segments are trimmed and empty ones dropped. The next
//! window starts `overlap` characters before the previous end; when that
//! would not advance, the start is forced to the previous end, so the walk
//! terminates even for `overlap >= chunk_size`.

use crate::document::Chunk;

/// A strategy for splitting extracted text into chunks.
///
/// Implementations produce [`Chunk`]s with ordinal indexes and length
/// metadata but no embeddings; embeddings are attached later by the service.
pub trait Chunker: Send + Sync {
    /// Split text into ordered chunks. Empty text yields an empty `Vec`.
    fn chunk(&self, text: &str) -> Vec<Chunk>;
}

/// The default [`Chunker`]: fixed-size windows snapped to text boundaries.
#[derive(Debug, Clone)]
pub struct BoundaryChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl BoundaryChunker {
    /// Create a new `BoundaryChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per window
    /// * `chunk_overlap` — characters shared between consecutive windows
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for BoundaryChunker {
    fn chunk(&self, text: &str) -> Vec<Chunk> {
        split_text(text, self.chunk_size, self.chunk_overlap)
            .into_iter()
            .enumerate()
            .map(|(index, text)| Chunk::new(index, text))
            .collect()
    }
}

/// `true` for the characters a window edge may snap back to.
fn is_boundary(c: char) -> bool {
    matches!(c, '.' | '\n' | ' ')
}

/// Split `text` into trimmed, non-empty segments of at most `chunk_size`
/// characters with `overlap` characters shared between neighbors.
///
/// Indexes are character positions, not byte offsets, so multilingual text
/// never splits inside a code point.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    if chunk_size == 0 {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < len {
        // The window end may exceed the text; the slice below caps it. The
        // uncapped value still drives the advance, matching the window walk.
        let mut end = start + chunk_size;

        if end < len {
            if let Some(rel) = chars[start..end].iter().rposition(|c| is_boundary(*c)) {
                // Snap only if the boundary is strictly after the window start.
                if rel > 0 {
                    end = start + rel + 1;
                }
            }
        }

        let slice_end = end.min(len);
        let segment: String = chars[start..slice_end].iter().collect();
        let trimmed = segment.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }

        // Forced advance: without relative progress the walk jumps to the
        // window end, which guarantees termination for overlap >= chunk_size.
        let next = end.saturating_sub(overlap);
        start = if next <= start { end } else { next };
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(split_text("", 100, 10).is_empty());
    }

    #[test]
    fn whitespace_only_input_yields_no_chunks() {
        assert!(split_text("   \n\n  ", 100, 10).is_empty());
    }

    #[test]
    fn short_text_yields_exactly_one_trimmed_chunk() {
        let chunks = split_text("  hello world  ", 100, 10);
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn snaps_to_sentence_boundary() {
        // Window of 20 lands mid-second-sentence; edge snaps back to the '.'.
        let text = "First sentence. Second sentence here.";
        let chunks = split_text(text, 20, 0);
        assert_eq!(chunks[0], "First sentence.");
    }

    #[test]
    fn hard_cut_when_no_boundary_in_window() {
        let text = "abcdefghijklmnopqrstuvwxyz";
        let chunks = split_text(text, 10, 0);
        assert_eq!(chunks, vec!["abcdefghij", "klmnopqrst", "uvwxyz"]);
    }

    #[test]
    fn overlap_repeats_window_tails() {
        let text = "abcdefghijklmnopqrst";
        let chunks = split_text(text, 10, 3);
        assert_eq!(chunks[0], "abcdefghij");
        assert!(chunks[1].starts_with("hij"));
    }

    #[test]
    fn terminates_when_overlap_reaches_chunk_size() {
        let text = "one two three four five six seven eight nine ten";
        let chunks = split_text(text, 10, 10);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(!chunk.trim().is_empty());
            assert!(chunk.chars().count() <= 10);
        }
    }

    #[test]
    fn terminates_when_overlap_exceeds_chunk_size() {
        let chunks = split_text("lorem ipsum dolor sit amet consectetur", 8, 50);
        assert!(!chunks.is_empty());
    }

    #[test]
    fn multibyte_text_splits_on_char_positions() {
        // Cyrillic text: every char is multi-byte in UTF-8.
        let text = "Привет мир это тест длинного текста на русском языке";
        let chunks = split_text(text, 20, 5);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 20);
        }
    }

    #[test]
    fn every_chunk_is_non_empty() {
        let text = "a. b. c. d. e. f. g. h. i. j. k. l. m. n. o. p.";
        for chunk in split_text(text, 7, 2) {
            assert!(!chunk.is_empty());
        }
    }

    #[test]
    fn boundary_chunker_assigns_gap_free_indexes_and_length_metadata() {
        let chunker = BoundaryChunker::new(15, 3);
        let chunks = chunker.chunk("First sentence. Second sentence. Third sentence.");
        assert!(!chunks.is_empty());
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert!(chunk.embedding.is_empty());
            let length: usize =
                chunk.metadata.get(crate::document::META_LENGTH).unwrap().parse().unwrap();
            assert_eq!(length, chunk.text.chars().count());
        }
    }
}
