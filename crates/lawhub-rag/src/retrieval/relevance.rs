//! Script filtering and keyword scoring of retrieved lines

use crate::types::Chunk;

/// Lines returned when nothing is configured otherwise
pub const DEFAULT_MAX_LINES: usize = 8;

/// Question tokens must be longer than this many characters to count
const MIN_WORD_CHARS: usize = 3;

/// Devanagari block; lines containing any of it are dropped
fn is_devanagari(c: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&c)
}

/// Selects the lines of retrieved chunks most relevant to a question.
///
/// Only Devanagari is filtered. Lines in other non-Latin scripts pass
/// through unchanged.
#[derive(Debug, Clone, Copy)]
pub struct RelevanceFilter {
    max_lines: usize,
}

impl RelevanceFilter {
    /// Create a filter returning at most `max_lines` lines
    pub fn new(max_lines: usize) -> Self {
        Self { max_lines }
    }

    /// Score and select lines from `chunks`, in the order given
    pub fn filter_and_score(&self, question: &str, chunks: &[Chunk]) -> Vec<String> {
        let lines: Vec<&str> = chunks
            .iter()
            .flat_map(|chunk| chunk.text.lines())
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| !line.chars().any(is_devanagari))
            .collect();

        let question = question.to_lowercase();
        let words: Vec<&str> = question
            .split_whitespace()
            .filter(|w| w.chars().count() > MIN_WORD_CHARS)
            .collect();

        let mut scored: Vec<(usize, &str)> = lines
            .iter()
            .filter_map(|line| {
                let lower = line.to_lowercase();
                let score = words.iter().filter(|w| lower.contains(**w)).count();
                (score > 0).then_some((score, *line))
            })
            .collect();

        if scored.is_empty() {
            return lines
                .into_iter()
                .take(self.max_lines)
                .map(str::to_string)
                .collect();
        }

        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored
            .into_iter()
            .take(self.max_lines)
            .map(|(_, line)| line.to_string())
            .collect()
    }
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINES)
    }
}

/// [`RelevanceFilter::filter_and_score`] with the default line limit
pub fn filter_and_score(question: &str, chunks: &[Chunk]) -> Vec<String> {
    RelevanceFilter::default().filter_and_score(question, chunks)
}
