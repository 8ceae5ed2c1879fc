//! Vector store provider trait for storing and searching embeddings

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Chunk;

/// Search result from vector store
#[derive(Debug, Clone)]
pub struct VectorSearchResult {
    /// The matched chunk
    pub chunk: Chunk,
    /// Similarity score, higher is more similar
    pub similarity: f32,
}

/// Trait for vector storage and similarity search
///
/// Implementations:
/// - `LocalVectorStore`: Flat in-memory index persisted as JSON
/// - `PineconeVectorStore`: Remote Pinecone index over REST
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Insert chunks that already carry embeddings
    async fn upsert(&self, chunks: &[Chunk]) -> Result<()>;

    /// Search for the `top_k` chunks most similar to the query embedding,
    /// best first
    async fn search(&self, query_embedding: &[f32], top_k: usize)
        -> Result<Vec<VectorSearchResult>>;

    /// Remove every stored vector
    async fn clear(&self) -> Result<()>;

    /// Get total number of vectors stored
    async fn len(&self) -> Result<usize>;

    /// Check if store is empty
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Check if the provider is healthy
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Human-readable description reported by the status endpoint
    fn descriptor(&self) -> String;
}
