//! Similarity retrieval over the embedding index

pub mod index;
pub mod relevance;
pub mod retriever;

pub use index::EmbeddingIndex;
pub use relevance::{filter_and_score, RelevanceFilter};
pub use retriever::Retriever;

use crate::types::Chunk;

/// A chunk returned by a similarity query
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    /// The matched chunk
    pub chunk: Chunk,
    /// Zero-based position in the result list
    pub rank: usize,
    /// Similarity to the query, higher is better
    pub similarity: f32,
}

/// Chunks ordered by descending similarity, at most `k` long
pub type RetrievalResult = Vec<RetrievedChunk>;
