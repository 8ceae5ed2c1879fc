//! Question-to-chunks retrieval with a fixed result size

use std::sync::Arc;

use crate::error::{Error, Result};

use super::index::EmbeddingIndex;
use super::RetrievalResult;

/// Default number of chunks retrieved per question
pub const DEFAULT_TOP_K: usize = 6;

/// Retrieves the top-k chunks for a question. No caching.
#[derive(Clone)]
pub struct Retriever {
    index: Arc<EmbeddingIndex>,
    k: usize,
}

impl Retriever {
    /// Create a retriever over an index
    pub fn new(index: Arc<EmbeddingIndex>, k: usize) -> Self {
        Self { index, k: k.max(1) }
    }

    /// Retrieve up to `k` chunks ordered by descending similarity
    pub async fn retrieve(&self, question: &str) -> Result<RetrievalResult> {
        let results = self
            .index
            .query(question, self.k)
            .await
            .map_err(|e| Error::Retrieval(e.to_string()))?;

        tracing::debug!("Retrieved {} chunks for question", results.len());
        Ok(results)
    }

    /// Configured result size
    pub fn k(&self) -> usize {
        self.k
    }

    /// Underlying index
    pub fn index(&self) -> &Arc<EmbeddingIndex> {
        &self.index
    }
}
