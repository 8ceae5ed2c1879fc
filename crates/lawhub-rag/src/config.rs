//! Configuration for the legal RAG pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Source document
    #[serde(default)]
    pub document: DocumentConfig,
    /// Embedding configuration
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
    /// Ollama/LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Retrieval and synthesis limits
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Local vector index configuration
    #[serde(default)]
    pub vector_db: VectorDbConfig,
    /// Remote index (disabled unless credentials are present)
    #[serde(default)]
    pub pinecone: Option<PineconeConfig>,
    /// Initialization policy
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl RagConfig {
    /// Load configuration from a TOML file, then apply environment overrides.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(path)?;
                toml::from_str(&raw).map_err(|e| {
                    Error::Config(format!("Invalid config file {}: {}", path.display(), e))
                })?
            }
            Some(path) => {
                tracing::warn!("Config file {} not found, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from an environment lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = non_empty("LAWHUB_DOCUMENT_PATH") {
            self.document.path = PathBuf::from(path);
        }
        if let Some(model) = non_empty("LAWHUB_EMBED_MODEL") {
            self.embeddings.model = model;
        }
        if let Some(model) = non_empty("LAWHUB_LLM_MODEL") {
            self.llm.generate_model = model;
        }
        if let Some(url) = non_empty("LAWHUB_OLLAMA_URL") {
            self.llm.base_url = url;
        }
        if let Some(dir) = non_empty("LAWHUB_PERSIST_DIR") {
            self.vector_db.persist_dir = PathBuf::from(dir);
        }

        let api_key = non_empty("PINECONE_API_KEY");
        let host = non_empty("PINECONE_INDEX_HOST");
        if api_key.is_some() || host.is_some() {
            let mut pinecone = self.pinecone.clone().unwrap_or_default();
            if let Some(key) = api_key {
                pinecone.api_key = key;
            }
            if let Some(host) = host {
                pinecone.index_host = host;
            }
            if let Some(name) = non_empty("PINECONE_INDEX_NAME") {
                pinecone.index_name = name;
            }
            self.pinecone = Some(pinecone);
        }
    }

    /// Remote index settings, only when fully configured
    pub fn remote_index(&self) -> Option<&PineconeConfig> {
        self.pinecone.as_ref().filter(|p| p.is_configured())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Initialize the pipeline before accepting requests
    pub preload: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            enable_cors: true,
            preload: true,
        }
    }
}

/// Source document configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Path to the reference document (PDF or plain text)
    pub path: PathBuf,
    /// Human-readable title used in citations and answer framing
    pub title: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/constitution.pdf"),
            title: "Constitution of India".to_string(),
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding model served by Ollama (all-MiniLM-L6-v2)
    pub model: String,
    /// Embedding dimensions (384 for MiniLM)
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "all-minilm".to_string(),
            dimensions: 384,
        }
    }
}

/// LLM (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Use a generative model at all; false forces extractive answers
    pub enabled: bool,
    /// Ollama base URL
    pub base_url: String,
    /// Generation model name
    pub generate_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// HTTP timeout for embedding and health requests in seconds
    pub timeout_secs: u64,
    /// Upper bound on a single generation call in seconds
    pub generation_timeout_secs: u64,
    /// Maximum tokens to generate
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:11434".to_string(),
            generate_model: "phi3".to_string(),
            temperature: 0.7,
            timeout_secs: 30,
            generation_timeout_secs: 60,
            max_tokens: 512,
        }
    }
}

impl LlmConfig {
    /// Generation timeout as a `Duration`
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1200,
            chunk_overlap: 200,
        }
    }
}

/// Retrieval and synthesis limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Chunks returned per query
    pub top_k: usize,
    /// Chunks concatenated into the generative prompt (and cited)
    pub context_chunks: usize,
    /// Chunks fed to the relevance filter in extractive mode
    pub extractive_chunks: usize,
    /// Lines kept by the relevance filter
    pub max_lines: usize,
    /// Lines rendered as bullets in an extractive answer
    pub extractive_bullets: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 6,
            context_chunks: 4,
            extractive_chunks: 3,
            max_lines: 8,
            extractive_bullets: 6,
        }
    }
}

/// Local vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorDbConfig {
    /// Directory holding the serialized index; non-empty means "load"
    pub persist_dir: PathBuf,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        let persist_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lawhub")
            .join("rag_store");

        Self { persist_dir }
    }
}

/// Pinecone remote index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PineconeConfig {
    /// API key sent as the `Api-Key` header
    pub api_key: String,
    /// Index host, e.g. `https://lawhub-constitution-abc123.svc.gcp-starter.pinecone.io`
    pub index_host: String,
    /// Index name, for status reporting
    pub index_name: String,
    /// Namespace inside the index
    pub namespace: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            index_host: String::new(),
            index_name: "lawhub-constitution".to_string(),
            namespace: String::new(),
            timeout_secs: 20,
        }
    }
}

impl PineconeConfig {
    /// Both credentials and an endpoint are required
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.index_host.trim().is_empty()
    }
}

/// Pipeline initialization policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Seconds to wait after a failed initialization before retrying.
    /// Zero retries on every call.
    pub init_retry_cooldown_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            init_retry_cooldown_secs: 30,
        }
    }
}
