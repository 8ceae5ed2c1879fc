//! Embedding index: backend selection, build/load and similarity query

use std::path::Path;
use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::providers::{
    EmbeddingProvider, LocalVectorStore, PineconeVectorStore, VectorStoreProvider,
};
use crate::types::Chunk;

use super::{RetrievalResult, RetrievedChunk};

/// Embeddings per request when building an index
const EMBED_BATCH_SIZE: usize = 32;

/// All chunks of the reference document with their embeddings, behind a
/// vector store backend
pub struct EmbeddingIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
}

impl EmbeddingIndex {
    /// Wrap an already populated store
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStoreProvider>) -> Self {
        Self { embedder, store }
    }

    /// Open the index for the configured backend.
    ///
    /// A configured remote index is tried first; any failure there falls
    /// back to the local store. `ingest` is only called when an index has
    /// to be built.
    pub async fn open<F>(
        config: &RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        ingest: F,
    ) -> Result<Self>
    where
        F: Fn() -> Result<Vec<Chunk>>,
    {
        if let Some(pinecone) = config.remote_index() {
            match PineconeVectorStore::new(pinecone) {
                Ok(store) => match Self::open_remote(Arc::new(store), Arc::clone(&embedder), &ingest).await {
                    Ok(index) => return Ok(index),
                    Err(e) => tracing::warn!("Remote index unavailable, using local store: {}", e),
                },
                Err(e) => tracing::warn!("Remote index misconfigured, using local store: {}", e),
            }
        }

        Self::open_local(
            &config.vector_db.persist_dir,
            config.embeddings.dimensions,
            embedder,
            &ingest,
        )
        .await
    }

    /// Load from the persist directory, or build and persist when there is
    /// nothing usable to load
    pub async fn open_local<F>(
        persist_dir: &Path,
        dimensions: usize,
        embedder: Arc<dyn EmbeddingProvider>,
        ingest: &F,
    ) -> Result<Self>
    where
        F: Fn() -> Result<Vec<Chunk>>,
    {
        if let Some(index) = Self::load(persist_dir, dimensions, Arc::clone(&embedder)).await? {
            return Ok(index);
        }

        let chunks = ingest()?;
        let store = Arc::new(LocalVectorStore::new(persist_dir, dimensions));
        let index = Self::build(chunks, embedder, store.clone()).await?;
        store.persist().await?;
        Ok(index)
    }

    /// Load a persisted local index. Absent and empty indexes both yield
    /// `None` so the caller rebuilds.
    pub async fn load(
        persist_dir: &Path,
        dimensions: usize,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Option<Self>> {
        let Some(store) = LocalVectorStore::load(persist_dir, dimensions)? else {
            return Ok(None);
        };

        if store.is_empty().await? {
            tracing::warn!(
                "Persisted index at {} holds no vectors, rebuilding",
                persist_dir.display()
            );
            return Ok(None);
        }

        Ok(Some(Self::new(embedder, Arc::new(store))))
    }

    /// Embed every chunk and insert into the store. All-or-nothing: the
    /// store is only written once every embedding succeeded, and a failed
    /// write clears whatever part of it reached the store.
    pub async fn build(
        chunks: Vec<Chunk>,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
    ) -> Result<Self> {
        if chunks.is_empty() {
            return Err(Error::index_build("Document produced no chunks"));
        }

        tracing::info!(
            "Building index over {} chunks with {} into {}",
            chunks.len(),
            embedder.name(),
            store.name()
        );

        let embedded = embed_chunks(embedder.as_ref(), chunks).await?;
        if let Err(e) = store.upsert(&embedded).await {
            if let Err(clear_err) = store.clear().await {
                tracing::error!(
                    "Could not clear partially written {} store: {}",
                    store.name(),
                    clear_err
                );
            }
            return Err(Error::index_build(format!("Failed to store embeddings: {}", e)));
        }

        Ok(Self::new(embedder, store))
    }

    async fn open_remote<F>(
        store: Arc<PineconeVectorStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        ingest: &F,
    ) -> Result<Self>
    where
        F: Fn() -> Result<Vec<Chunk>>,
    {
        if let Some(dimension) = store.dimension().await? {
            if dimension != embedder.dimensions() {
                return Err(Error::vector_db(format!(
                    "Remote index has {} dimensions, embedder produces {}",
                    dimension,
                    embedder.dimensions()
                )));
            }
        }

        let count = store.len().await?;
        if count > 0 {
            tracing::info!("Remote index contains {} vectors", count);
            return Ok(Self::new(embedder, store));
        }

        tracing::info!("Remote index is empty, uploading document");
        Self::build(ingest()?, embedder, store).await
    }

    /// Query the index for the `k` chunks most similar to `text`
    pub async fn query(&self, text: &str, k: usize) -> Result<RetrievalResult> {
        let embedding = self.embedder.embed(text).await?;
        let results = self.store.search(&embedding, k).await?;

        Ok(results
            .into_iter()
            .take(k)
            .enumerate()
            .map(|(rank, r)| RetrievedChunk {
                chunk: r.chunk,
                rank,
                similarity: r.similarity,
            })
            .collect())
    }

    /// Number of indexed chunks
    pub async fn len(&self) -> Result<usize> {
        self.store.len().await
    }

    /// Whether the index holds no chunks
    pub async fn is_empty(&self) -> Result<bool> {
        self.store.is_empty().await
    }

    /// Backend description for status reporting
    pub fn descriptor(&self) -> String {
        self.store.descriptor()
    }
}

async fn embed_chunks(embedder: &dyn EmbeddingProvider, chunks: Vec<Chunk>) -> Result<Vec<Chunk>> {
    let mut embedded = Vec::with_capacity(chunks.len());

    for batch in chunks.chunks(EMBED_BATCH_SIZE) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder
            .embed_batch(&texts)
            .await
            .map_err(|e| Error::index_build(format!("Embedding failed: {}", e)))?;

        if embeddings.len() != batch.len() {
            return Err(Error::index_build(format!(
                "Embedder returned {} vectors for {} chunks",
                embeddings.len(),
                batch.len()
            )));
        }

        for (chunk, embedding) in batch.iter().zip(embeddings) {
            let mut chunk = chunk.clone();
            chunk.embedding = Some(embedding);
            embedded.push(chunk);
        }
    }

    Ok(embedded)
}
