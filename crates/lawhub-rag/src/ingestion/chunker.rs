//! Recursive character splitting with page tracking

use crate::types::{Chunk, ChunkMetadata, Page};

/// Boundaries tried in order of preference: paragraph, line, word
const SEPARATORS: &[&str] = &["\n\n", "\n", " "];

/// Text chunker with configurable size and overlap.
///
/// Sizes are measured in characters. Every chunk after the first in a page
/// starts with exactly the last `overlap` characters of its predecessor, so
/// dropping those prefixes and concatenating reconstructs the page text.
pub struct TextChunker {
    /// Maximum chunk size in characters
    chunk_size: usize,
    /// Overlap between consecutive chunks
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(2);
        let clamped = overlap.min(chunk_size / 2);
        if clamped != overlap {
            tracing::warn!(
                "Chunk overlap {} too large for chunk size {}, using {}",
                overlap,
                chunk_size,
                clamped
            );
        }

        Self {
            chunk_size,
            overlap: clamped,
        }
    }

    /// Configured overlap (after clamping)
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Chunk every page, numbering chunks across the whole document
    pub fn chunk_pages(&self, pages: &[Page]) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for page in pages {
            for text in self.split_text(&page.text) {
                let chunk_index = chunks.len() as u32;
                chunks.push(Chunk::new(
                    text,
                    ChunkMetadata {
                        source_id: page.source_id.clone(),
                        page_number: page.page_number,
                        chunk_index,
                    },
                ));
            }
        }

        chunks
    }

    /// Split one page of text into overlapping windows
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let mut pieces = Vec::new();

        if chars.is_empty() {
            return pieces;
        }

        let mut start = 0usize;
        loop {
            if chars.len() - start <= self.chunk_size {
                pieces.push(chars[start..].iter().collect());
                break;
            }

            let end = self.find_cut(&chars, start);
            pieces.push(chars[start..end].iter().collect());
            start = end - self.overlap;
        }

        pieces
    }

    /// Pick the end of the window starting at `start`.
    ///
    /// The cut lands right after the latest preferred separator in the
    /// right half of the window (and past the overlap); otherwise it is a
    /// hard cut at `chunk_size`.
    fn find_cut(&self, chars: &[char], start: usize) -> usize {
        let limit = start + self.chunk_size;
        let min_cut = start + (self.overlap + 1).max(self.chunk_size / 2);

        for separator in SEPARATORS {
            let sep: Vec<char> = separator.chars().collect();
            let mut cut = limit;
            while cut >= min_cut && cut >= sep.len() {
                if chars[cut - sep.len()..cut] == sep[..] {
                    return cut;
                }
                cut -= 1;
            }
        }

        limit
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(1200, 200)
    }
}
