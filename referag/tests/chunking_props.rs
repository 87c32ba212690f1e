//! Property tests for the boundary-aware text splitter.

use proptest::prelude::*;
use referag::split_text;

/// **Property: splitting terminates and yields non-empty chunks.**
/// *For any* text and any `chunk_size > overlap`, `split_text` SHALL return
/// a finite sequence whose every element is non-empty after trimming, and
/// every element SHALL appear as a substring of the input.
mod prop_split_terminates_non_empty {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn chunks_non_empty_and_from_input(
            text in ".{0,400}",
            chunk_size in 2usize..60,
            overlap_frac in 0usize..100,
        ) {
            let overlap = overlap_frac * (chunk_size - 1) / 100;
            let chunks = split_text(&text, chunk_size, overlap);

            for chunk in &chunks {
                prop_assert!(!chunk.trim().is_empty());
                prop_assert!(text.contains(chunk.as_str()));
            }
        }
    }
}

/// **Property: chunk count is bounded on boundary-free text.**
/// *For any* text without sentence or word boundaries, the number of chunks
/// SHALL be at most `ceil(len / (chunk_size - overlap)) + 1`, since every
/// window advances by at least `chunk_size - overlap` characters.
mod prop_split_count_bounded {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn count_bounded_without_boundaries(
            text in "[a-z0-9]{0,400}",
            chunk_size in 2usize..60,
            overlap_frac in 0usize..100,
        ) {
            let overlap = overlap_frac * (chunk_size - 1) / 100;
            let chunks = split_text(&text, chunk_size, overlap);

            let len = text.chars().count();
            let step = chunk_size - overlap;
            let bound = len.div_ceil(step) + 1;
            prop_assert!(chunks.len() <= bound, "{} chunks > bound {}", chunks.len(), bound);
        }
    }
}

/// **Property: short input round-trips to a single trimmed chunk.**
/// *For any* text shorter than `chunk_size` with at least one non-whitespace
/// character, `split_text` SHALL return exactly one chunk equal to the
/// trimmed input.
mod prop_split_short_input_identity {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn short_input_is_one_trimmed_chunk(text in ".{1,40}") {
            prop_assume!(!text.trim().is_empty());
            let chunk_size = text.chars().count() + 1;
            let chunks = split_text(&text, chunk_size, 0);

            prop_assert_eq!(chunks.len(), 1);
            prop_assert_eq!(chunks[0].as_str(), text.trim());
        }
    }
}

/// **Property: degenerate overlap still terminates.**
/// *For any* text, `overlap >= chunk_size` SHALL not loop forever: the
/// splitter falls back to advancing a full window at a time.
mod prop_split_degenerate_overlap {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn oversized_overlap_terminates(
            text in ".{0,200}",
            chunk_size in 2usize..40,
            extra in 0usize..40,
        ) {
            let chunks = split_text(&text, chunk_size, chunk_size + extra);
            prop_assert!(chunks.len() <= text.chars().count() + 1);
        }
    }
}
