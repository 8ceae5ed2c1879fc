//! Page and chunk types with provenance tracking for citations

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// One page of extracted document text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Text content of the page
    pub text: String,
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Source identifier (the document path as configured)
    pub source_id: String,
}

impl Page {
    /// Create a new page
    pub fn new(text: impl Into<String>, page_number: u32, source_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            page_number,
            source_id: source_id.into(),
        }
    }
}

/// Provenance of a chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Source identifier
    pub source_id: String,
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Position of the chunk within the whole document
    pub chunk_index: u32,
}

/// A bounded span of page text, the unit of retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Text content
    pub text: String,
    /// Provenance
    pub metadata: ChunkMetadata,
    /// Normalized embedding (absent until indexed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Chunk {
    /// Create a new chunk without an embedding
    pub fn new(text: String, metadata: ChunkMetadata) -> Self {
        Self {
            text,
            metadata,
            embedding: None,
        }
    }

    /// Stable identifier derived from provenance and content.
    ///
    /// Identical chunk input always yields the same id, which keeps
    /// remote upserts idempotent across rebuilds.
    pub fn id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.metadata.source_id.as_bytes());
        hasher.update(self.metadata.page_number.to_le_bytes());
        hasher.update(self.metadata.chunk_index.to_le_bytes());
        hasher.update(self.text.as_bytes());
        let digest = hasher.finalize();
        hex::encode(&digest[..16])
    }

    /// Convert to flat metadata for remote vector storage
    pub fn to_vector_metadata(&self) -> HashMap<String, serde_json::Value> {
        let mut meta = HashMap::new();
        meta.insert("text".to_string(), serde_json::json!(self.text));
        meta.insert("source".to_string(), serde_json::json!(self.metadata.source_id));
        meta.insert("page".to_string(), serde_json::json!(self.metadata.page_number));
        meta.insert("chunk_index".to_string(), serde_json::json!(self.metadata.chunk_index));
        meta
    }

    /// Rebuild a chunk from flat vector metadata
    pub fn from_vector_metadata(meta: &serde_json::Map<String, serde_json::Value>) -> Option<Self> {
        let text = meta.get("text")?.as_str()?.to_string();
        let source_id = meta.get("source")?.as_str()?.to_string();
        let page_number = meta.get("page")?.as_f64()? as u32;
        let chunk_index = meta
            .get("chunk_index")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0) as u32;

        Some(Self::new(
            text,
            ChunkMetadata {
                source_id,
                page_number,
                chunk_index,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Chunk {
        Chunk::new(
            "Article 21. No person shall be deprived of his life or personal liberty.".to_string(),
            ChunkMetadata {
                source_id: "coi.pdf".to_string(),
                page_number: 12,
                chunk_index: 40,
            },
        )
    }

    #[test]
    fn test_chunk_id_is_stable() {
        assert_eq!(sample().id(), sample().id());
        assert_eq!(sample().id().len(), 32);

        let mut other = sample();
        other.metadata.page_number = 13;
        assert_ne!(sample().id(), other.id());
    }

    #[test]
    fn test_vector_metadata_restores_chunk() {
        let chunk = sample();
        let meta: serde_json::Map<String, serde_json::Value> =
            chunk.to_vector_metadata().into_iter().collect();

        let restored = Chunk::from_vector_metadata(&meta).unwrap();
        assert_eq!(restored, chunk);
    }
}
