//! Document chunking strategies.
//!
//! This module provides the [`Chunker`] trait and two implementations:
//!
//! - [`RecursiveChunker`] — prefers breaking at paragraph, sentence, line,
//!   then word boundaries (the default for ingestion)
//! - [`FixedSizeChunker`] — splits by character count alone
//!
//! Both work in characters, not bytes, so multi-byte text never splits
//! inside a code point, and both record each chunk's starting character
//! offset in the source text.

use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};

/// Separator tiers tried from highest to lowest priority when choosing a
/// break point inside a window. The separator stays attached to the
/// preceding chunk.
const SEPARATOR_TIERS: &[&[&str]] = &[&["\n\n"], &[". ", "! ", "? "], &["\n"], &[" "]];

/// A strategy for splitting documents into chunks.
///
/// Implementations are pure functions over their inputs: no side effects,
/// no state beyond the configured window parameters.
pub trait Chunker: Send + Sync {
    /// Split a document into ordered chunks.
    ///
    /// Returns an empty `Vec` for a document with empty text. A document
    /// shorter than the chunk size yields exactly one chunk equal to the
    /// full text.
    fn split(&self, document: &Document) -> Vec<Chunk>;
}

fn validate_window(chunk_size: usize, chunk_overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(RagError::InvalidConfiguration(
            "chunk_size must be greater than zero".to_string(),
        ));
    }
    if chunk_overlap >= chunk_size {
        return Err(RagError::InvalidConfiguration(format!(
            "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
        )));
    }
    Ok(())
}

/// Assemble `(start_offset, content)` pairs into [`Chunk`]s for a document.
fn into_chunks(document: &Document, pieces: Vec<(usize, String)>) -> Vec<Chunk> {
    pieces
        .into_iter()
        .enumerate()
        .map(|(sequence, (start_offset, content))| Chunk {
            content,
            start_offset,
            sequence,
            source_id: document.source_id.clone(),
        })
        .collect()
}

/// Splits text into chunks preferring natural break points.
///
/// Each chunk covers a window of at most `chunk_size` characters. Within the
/// window the split point is the end of the last occurrence of the highest
/// priority separator (paragraph break, sentence break, line break, space);
/// if no separator leaves room to advance past the overlap, the window is
/// cut at `chunk_size` characters exactly. Consecutive chunks share exactly
/// `chunk_overlap` characters at the boundary.
///
/// # Example
///
/// ```rust,ignore
/// use ragdoc_core::RecursiveChunker;
///
/// let chunker = RecursiveChunker::new(2000, 500)?;
/// let chunks = chunker.split(&document);
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if `chunk_size == 0` or
    /// `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        validate_window(chunk_size, chunk_overlap)?;
        Ok(Self { chunk_size, chunk_overlap })
    }
}

impl Chunker for RecursiveChunker {
    fn split(&self, document: &Document) -> Vec<Chunk> {
        let pieces = split_preferring_separators(&document.text, self.chunk_size, self.chunk_overlap);
        into_chunks(document, pieces)
    }
}

/// Splits text into fixed-size windows by character count.
///
/// No separator preference: every chunk except the last is exactly
/// `chunk_size` characters, and consecutive chunks share exactly
/// `chunk_overlap` characters.
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if `chunk_size == 0` or
    /// `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        validate_window(chunk_size, chunk_overlap)?;
        Ok(Self { chunk_size, chunk_overlap })
    }
}

impl Chunker for FixedSizeChunker {
    fn split(&self, document: &Document) -> Vec<Chunk> {
        let pieces =
            split_windowed(&document.text, self.chunk_size, self.chunk_overlap, |_, _, _, end| end);
        into_chunks(document, pieces)
    }
}

/// Character-boundary byte offsets for `text`: `boundaries[i]` is the byte
/// at which character `i` starts, with `text.len()` appended as sentinel.
fn char_boundaries(text: &str) -> Vec<usize> {
    let mut boundaries: Vec<usize> = text.char_indices().map(|(byte, _)| byte).collect();
    boundaries.push(text.len());
    boundaries
}

/// Windowed split core shared by both chunkers.
///
/// `pick_end(text, boundaries, start, window_end)` chooses the character
/// index ending the current chunk; it must return a value in
/// `(start + overlap, window_end]` so the split always advances.
fn split_windowed(
    text: &str,
    chunk_size: usize,
    overlap: usize,
    pick_end: impl Fn(&str, &[usize], usize, usize) -> usize,
) -> Vec<(usize, String)> {
    let boundaries = char_boundaries(text);
    let total = boundaries.len() - 1;

    if total == 0 {
        return Vec::new();
    }
    if total <= chunk_size {
        return vec![(0, text.to_string())];
    }

    let mut pieces = Vec::new();
    let mut start = 0usize;
    loop {
        let window_end = (start + chunk_size).min(total);
        if window_end == total {
            pieces.push((start, text[boundaries[start]..].to_string()));
            break;
        }
        let end = pick_end(text, &boundaries, start, window_end);
        pieces.push((start, text[boundaries[start]..boundaries[end]].to_string()));
        start = end - overlap;
    }
    pieces
}

fn split_preferring_separators(text: &str, chunk_size: usize, overlap: usize) -> Vec<(usize, String)> {
    split_windowed(text, chunk_size, overlap, |text, boundaries, start, window_end| {
        break_point(text, boundaries, start, window_end, overlap)
    })
}

/// Choose the character index to end the current chunk at: the end of the
/// last occurrence of the highest-priority separator inside the window, as
/// long as it leaves room to advance past the overlap; otherwise the full
/// window.
fn break_point(
    text: &str,
    boundaries: &[usize],
    start: usize,
    window_end: usize,
    overlap: usize,
) -> usize {
    let window = &text[boundaries[start]..boundaries[window_end]];
    for tier in SEPARATOR_TIERS {
        let mut best: Option<usize> = None;
        for separator in *tier {
            if let Some(pos) = window.rfind(separator) {
                let end_byte = boundaries[start] + pos + separator.len();
                // Separators are ASCII, so end_byte is always a character
                // boundary and the search hits exactly.
                let end_char = boundaries
                    .binary_search(&end_byte)
                    .unwrap_or_else(|insertion| insertion);
                if end_char > start + overlap && best.map_or(true, |b| end_char > b) {
                    best = Some(end_char);
                }
            }
        }
        if let Some(end) = best {
            return end;
        }
    }
    window_end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document::new("test.txt", text)
    }

    /// Count of characters shared between the tail of `a` and the head of `b`.
    fn shared_boundary(a: &Chunk, b: &Chunk) -> usize {
        a.start_offset + a.content.chars().count() - b.start_offset
    }

    #[test]
    fn empty_document_yields_no_chunks() {
        let chunker = RecursiveChunker::new(100, 20).unwrap();
        assert!(chunker.split(&doc("")).is_empty());
    }

    #[test]
    fn short_document_yields_single_full_chunk() {
        let chunker = RecursiveChunker::new(100, 20).unwrap();
        let chunks = chunker.split(&doc("a short document"));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "a short document");
        assert_eq!(chunks[0].start_offset, 0);
        assert_eq!(chunks[0].sequence, 0);
    }

    #[test]
    fn rejects_zero_chunk_size() {
        assert!(matches!(
            RecursiveChunker::new(0, 0),
            Err(RagError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn rejects_overlap_not_smaller_than_chunk_size() {
        assert!(matches!(
            RecursiveChunker::new(10, 10),
            Err(RagError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            FixedSizeChunker::new(10, 12),
            Err(RagError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn consecutive_chunks_share_exactly_the_overlap() {
        let text = "The sky is blue. The grass is green.";
        let chunker = RecursiveChunker::new(20, 5).unwrap();
        let chunks = chunker.split(&doc(text));

        assert!(chunks.len() >= 2);
        for pair in chunks.windows(2) {
            assert_eq!(shared_boundary(&pair[0], &pair[1]), 5);
            let tail: String = pair[0]
                .content
                .chars()
                .skip(pair[0].content.chars().count() - 5)
                .collect();
            let head: String = pair[1].content.chars().take(5).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn chunk_contents_match_recorded_offsets() {
        let text = "One sentence here. Another one follows it. And a third for good measure.";
        let chunker = RecursiveChunker::new(30, 8).unwrap();
        let all: Vec<char> = text.chars().collect();

        for chunk in chunker.split(&doc(text)) {
            let expected: String = all
                .iter()
                .skip(chunk.start_offset)
                .take(chunk.content.chars().count())
                .collect();
            assert_eq!(chunk.content, expected);
            assert!(chunk.content.chars().count() <= 30);
        }
    }

    #[test]
    fn prefers_sentence_breaks_over_spaces() {
        let text = "The sky is blue. The grass is green.";
        let chunker = RecursiveChunker::new(20, 5).unwrap();
        let chunks = chunker.split(&doc(text));
        assert_eq!(chunks[0].content, "The sky is blue. ");
    }

    #[test]
    fn prefers_paragraph_breaks_over_sentence_breaks() {
        let text = "First part. More.\n\nSecond paragraph continues for a while longer here.";
        let chunker = RecursiveChunker::new(30, 4).unwrap();
        let chunks = chunker.split(&doc(text));
        assert_eq!(chunks[0].content, "First part. More.\n\n");
    }

    #[test]
    fn falls_back_to_raw_characters_without_separators() {
        let text = "abcdefghijklmnopqrstuvwxyz0123456789";
        let chunker = RecursiveChunker::new(10, 2).unwrap();
        let chunks = chunker.split(&doc(text));

        assert_eq!(chunks[0].content, "abcdefghij");
        assert_eq!(chunks[1].start_offset, 8);
        for chunk in &chunks {
            assert!(chunk.content.chars().count() <= 10);
        }
    }

    #[test]
    fn multibyte_text_splits_on_character_counts() {
        let text = "círculo métrico à côté de la fenêtre ouverte année après année";
        let chunker = FixedSizeChunker::new(16, 4).unwrap();
        let all: Vec<char> = text.chars().collect();

        let chunks = chunker.split(&doc(text));
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.content.chars().count() <= 16);
            let expected: String = all
                .iter()
                .skip(chunk.start_offset)
                .take(chunk.content.chars().count())
                .collect();
            assert_eq!(chunk.content, expected);
        }
    }

    #[test]
    fn fixed_size_windows_are_exact() {
        let text = "0123456789abcdefghij";
        let chunker = FixedSizeChunker::new(8, 3).unwrap();
        let chunks = chunker.split(&doc(text));

        assert_eq!(chunks[0].content, "01234567");
        assert_eq!(chunks[1].start_offset, 5);
        assert_eq!(chunks[1].content, "56789abc");
    }
}
