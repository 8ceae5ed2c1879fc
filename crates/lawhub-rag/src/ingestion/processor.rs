//! Ingestion pipeline orchestration

use std::path::Path;

use crate::config::ChunkingConfig;
use crate::error::Result;
use crate::types::{Chunk, Page};

use super::chunker::TextChunker;
use super::parser::DocumentLoader;

/// Main ingestion pipeline
pub struct IngestPipeline {
    /// Text chunker
    chunker: TextChunker,
}

impl IngestPipeline {
    /// Create a new ingestion pipeline
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunker: TextChunker::new(chunk_size, chunk_overlap),
        }
    }

    /// Create from chunking configuration
    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Create chunks from already extracted pages
    pub fn create_chunks(&self, pages: &[Page]) -> Vec<Chunk> {
        self.chunker.chunk_pages(pages)
    }

    /// Full ingestion: load pages + chunk
    pub fn ingest(&self, path: &Path) -> Result<Vec<Chunk>> {
        let pages = DocumentLoader::load(path)?;
        let chunks = self.create_chunks(&pages);

        tracing::info!(
            "Ingested {} pages into {} chunks from {}",
            pages.len(),
            chunks.len(),
            path.display()
        );

        Ok(chunks)
    }
}

impl Default for IngestPipeline {
    fn default() -> Self {
        Self::new(1200, 200)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_ingest_text_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coi.txt");
        let page_one = "Article 14. Equality before law.\n".repeat(60);
        std::fs::write(&path, format!("{}\u{000C}Article 21. Protection of life.", page_one))
            .unwrap();

        let chunks = IngestPipeline::default().ingest(&path).unwrap();

        assert!(chunks.len() >= 3);
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 1200));
        let last = chunks.last().unwrap();
        assert_eq!(last.metadata.page_number, 2);
        assert_eq!(last.text, "Article 21. Protection of life.");
        assert!(chunks.iter().all(|c| c.embedding.is_none()));
    }

    #[test]
    fn test_ingest_missing_document() {
        let err = IngestPipeline::default()
            .ingest(Path::new("/nonexistent/constitution.pdf"))
            .unwrap_err();
        assert!(matches!(err, Error::DocumentNotFound(_)));
    }
}
