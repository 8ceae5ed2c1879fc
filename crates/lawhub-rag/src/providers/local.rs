//! Local flat vector index persisted as JSON
//!
//! Exact nearest-neighbour search over L2-normalized embeddings. The corpus
//! is a single document, so a linear scan stays well under a millisecond.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::Chunk;

use super::vector_store::{VectorSearchResult, VectorStoreProvider};

/// File name of the persisted index inside the persist directory
pub const INDEX_FILE: &str = "index.json";

/// On-disk format version
const FORMAT_VERSION: u32 = 1;

/// Scale a vector to unit length in place; zero vectors are left alone
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

#[derive(Serialize, Deserialize)]
struct IndexFile {
    version: u32,
    dimensions: usize,
    chunks: Vec<Chunk>,
}

/// Stored chunks in insertion order, with each chunk id's position
#[derive(Default)]
struct Entries {
    chunks: Vec<Chunk>,
    positions: HashMap<String, usize>,
}

impl Entries {
    fn from_chunks(chunks: Vec<Chunk>) -> Self {
        let mut entries = Self::default();
        entries.extend(chunks.into_iter().map(|c| (c.id(), c)));
        entries
    }

    /// Replace chunks whose id is already stored, append the rest
    fn extend(&mut self, keyed: impl IntoIterator<Item = (String, Chunk)>) {
        for (id, chunk) in keyed {
            match self.positions.get(&id) {
                Some(&i) => self.chunks[i] = chunk,
                None => {
                    self.positions.insert(id, self.chunks.len());
                    self.chunks.push(chunk);
                }
            }
        }
    }
}

/// In-memory flat index with JSON persistence
pub struct LocalVectorStore {
    persist_dir: PathBuf,
    dimensions: usize,
    entries: RwLock<Entries>,
}

impl LocalVectorStore {
    /// Create an empty store bound to a persist directory
    pub fn new(persist_dir: impl Into<PathBuf>, dimensions: usize) -> Self {
        Self {
            persist_dir: persist_dir.into(),
            dimensions,
            entries: RwLock::new(Entries::default()),
        }
    }

    /// Load a previously persisted index.
    ///
    /// Returns `Ok(None)` when the directory is absent or empty. A directory
    /// with content but no readable index is an [`Error::IndexBuild`].
    pub fn load(persist_dir: &Path, dimensions: usize) -> Result<Option<Self>> {
        let index_path = persist_dir.join(INDEX_FILE);

        if !index_path.is_file() {
            let has_content = match std::fs::read_dir(persist_dir) {
                Ok(mut entries) => entries.next().is_some(),
                Err(_) => false,
            };
            if has_content {
                return Err(Error::index_build(format!(
                    "{} is not empty but holds no {}",
                    persist_dir.display(),
                    INDEX_FILE
                )));
            }
            return Ok(None);
        }

        let data = std::fs::read(&index_path)?;
        let file: IndexFile = serde_json::from_slice(&data).map_err(|e| {
            Error::index_build(format!("Corrupt index at {}: {}", index_path.display(), e))
        })?;

        if file.version != FORMAT_VERSION {
            return Err(Error::index_build(format!(
                "Unsupported index format version {}",
                file.version
            )));
        }
        if file.dimensions != dimensions {
            return Err(Error::index_build(format!(
                "Persisted index has {} dimensions, expected {}",
                file.dimensions, dimensions
            )));
        }

        tracing::info!(
            "Loaded {} chunks from {}",
            file.chunks.len(),
            index_path.display()
        );

        Ok(Some(Self {
            persist_dir: persist_dir.to_path_buf(),
            dimensions,
            entries: RwLock::new(Entries::from_chunks(file.chunks)),
        }))
    }

    /// Write the index atomically to the persist directory
    pub async fn persist(&self) -> Result<()> {
        let bytes = {
            let entries = self.entries.read();
            serde_json::to_vec(&IndexFile {
                version: FORMAT_VERSION,
                dimensions: self.dimensions,
                chunks: entries.chunks.clone(),
            })?
        };
        let dir = self.persist_dir.clone();

        tokio::task::spawn_blocking(move || -> Result<()> {
            std::fs::create_dir_all(&dir)?;
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(&bytes)?;
            tmp.flush()?;
            tmp.as_file().sync_all()?;
            tmp.persist(dir.join(INDEX_FILE))
                .map_err(|e| Error::Io(e.error))?;
            Ok(())
        })
        .await
        .map_err(|e| Error::internal(format!("Task join error: {}", e)))??;

        tracing::info!("Persisted index to {}", self.persist_dir.display());
        Ok(())
    }

    /// Persist directory
    pub fn persist_dir(&self) -> &Path {
        &self.persist_dir
    }

    fn check_dimensions(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimensions {
            return Err(Error::vector_db(format!(
                "Dimension mismatch: expected {}, got {}",
                self.dimensions,
                vector.len()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl VectorStoreProvider for LocalVectorStore {
    async fn upsert(&self, chunks: &[Chunk]) -> Result<()> {
        let mut prepared = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let mut embedding = chunk
                .embedding
                .clone()
                .ok_or_else(|| Error::vector_db(format!("Chunk {} has no embedding", chunk.id())))?;
            self.check_dimensions(&embedding)?;
            l2_normalize(&mut embedding);

            let mut chunk = chunk.clone();
            chunk.embedding = Some(embedding);
            prepared.push((chunk.id(), chunk));
        }

        self.entries.write().extend(prepared);
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<VectorSearchResult>> {
        self.check_dimensions(query_embedding)?;
        let mut query = query_embedding.to_vec();
        l2_normalize(&mut query);

        let entries = self.entries.read();
        let stored = &entries.chunks;
        let mut scored: Vec<(usize, f32)> = stored
            .iter()
            .enumerate()
            .filter_map(|(i, chunk)| {
                chunk.embedding.as_ref().map(|embedding| {
                    let similarity = embedding.iter().zip(&query).map(|(a, b)| a * b).sum();
                    (i, similarity)
                })
            })
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(i, similarity)| VectorSearchResult {
                chunk: stored[i].clone(),
                similarity,
            })
            .collect())
    }

    async fn clear(&self) -> Result<()> {
        *self.entries.write() = Entries::default();
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.entries.read().chunks.len())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "local-flat"
    }

    fn descriptor(&self) -> String {
        format!("Local index ({})", self.persist_dir.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkMetadata;

    fn chunk(text: &str, index: u32, embedding: Vec<f32>) -> Chunk {
        let mut chunk = Chunk::new(
            text.to_string(),
            ChunkMetadata {
                source_id: "coi.pdf".to_string(),
                page_number: index + 1,
                chunk_index: index,
            },
        );
        chunk.embedding = Some(embedding);
        chunk
    }

    #[test]
    fn test_l2_normalize() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);

        let mut zero = vec![0.0, 0.0];
        l2_normalize(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity_with_stable_ties() {
        let store = LocalVectorStore::new("/tmp/unused", 2);
        store
            .upsert(&[
                chunk("east", 0, vec![1.0, 0.0]),
                chunk("north", 1, vec![0.0, 1.0]),
                chunk("east again", 2, vec![2.0, 0.0]),
            ])
            .await
            .unwrap();

        let results = store.search(&[5.0, 0.0], 3).await.unwrap();
        let texts: Vec<&str> = results.iter().map(|r| r.chunk.text.as_str()).collect();
        assert_eq!(texts, vec!["east", "east again", "north"]);
        assert!((results[0].similarity - 1.0).abs() < 1e-6);

        assert_eq!(store.search(&[1.0, 0.0], 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_rejects_bad_input() {
        let store = LocalVectorStore::new("/tmp/unused", 3);
        let err = store.upsert(&[chunk("a", 0, vec![1.0])]).await.unwrap_err();
        assert!(matches!(err, Error::VectorDb(_)));

        let bare = Chunk::new(
            "b".to_string(),
            ChunkMetadata {
                source_id: "coi.pdf".to_string(),
                page_number: 1,
                chunk_index: 0,
            },
        );
        assert!(store.upsert(&[bare]).await.is_err());
        assert!(store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let store = LocalVectorStore::new("/tmp/unused", 2);
        let c = chunk("same", 0, vec![1.0, 1.0]);
        store.upsert(&[c.clone()]).await.unwrap();
        store.upsert(&[c]).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_replaces_in_place_across_batches() {
        let store = LocalVectorStore::new("/tmp/unused", 2);
        let batch: Vec<Chunk> = (0..500)
            .map(|i| chunk(&format!("provision {}", i), i, vec![1.0, i as f32]))
            .collect();
        store.upsert(&batch).await.unwrap();

        let mut updated = batch[250].clone();
        updated.embedding = Some(vec![0.0, -1.0]);
        store
            .upsert(&[updated, chunk("schedule", 500, vec![1.0, 0.0])])
            .await
            .unwrap();
        assert_eq!(store.len().await.unwrap(), 501);

        let results = store.search(&[0.0, -1.0], 1).await.unwrap();
        assert_eq!(results[0].chunk.text, "provision 250");

        let entries = store.entries.read();
        assert_eq!(entries.chunks[250].text, "provision 250");
        assert_eq!(entries.chunks[500].text, "schedule");
        assert_eq!(entries.positions.len(), 501);
        drop(entries);

        store.clear().await.unwrap();
        assert!(store.is_empty().await.unwrap());
        store.upsert(&batch[..2]).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_persist_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let persist_dir = dir.path().join("store");

        assert!(LocalVectorStore::load(&persist_dir, 2).unwrap().is_none());

        let store = LocalVectorStore::new(&persist_dir, 2);
        store
            .upsert(&[chunk("Article 21", 0, vec![0.0, 2.0])])
            .await
            .unwrap();
        store.persist().await.unwrap();

        let loaded = LocalVectorStore::load(&persist_dir, 2).unwrap().unwrap();
        assert_eq!(loaded.len().await.unwrap(), 1);
        loaded
            .upsert(&[chunk("Article 21", 0, vec![0.0, 3.0])])
            .await
            .unwrap();
        assert_eq!(loaded.len().await.unwrap(), 1);
        let results = loaded.search(&[0.0, 1.0], 1).await.unwrap();
        assert_eq!(results[0].chunk.text, "Article 21");

        let err = LocalVectorStore::load(&persist_dir, 384).err().unwrap();
        assert!(matches!(err, Error::IndexBuild(_)));
    }

    #[test]
    fn test_load_rejects_foreign_directory_content() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("chroma.sqlite3"), b"junk").unwrap();

        let err = LocalVectorStore::load(dir.path(), 2).err().unwrap();
        assert!(matches!(err, Error::IndexBuild(_)));

        std::fs::write(dir.path().join(INDEX_FILE), b"{not json").unwrap();
        let err = LocalVectorStore::load(dir.path(), 2).err().unwrap();
        assert!(matches!(err, Error::IndexBuild(_)));
    }
}
