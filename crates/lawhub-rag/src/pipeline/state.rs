//! Lazily initialized, process-wide pipeline state

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::generation::{SynthesisMode, SynthesisSettings, Synthesizer};
use crate::ingestion::IngestPipeline;
use crate::providers::{
    EmbeddingProvider, LlmProvider, OllamaClient, OllamaEmbedder, OllamaLlm,
};
use crate::retrieval::{EmbeddingIndex, Retriever};

/// What happens after a failed initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitRetryPolicy {
    /// Every call retries initialization
    Unconditional,
    /// Calls within the window after a failure skip initialization
    Cooldown(Duration),
}

impl InitRetryPolicy {
    /// Zero seconds means retry on every call
    pub fn from_secs(secs: u64) -> Self {
        if secs == 0 {
            Self::Unconditional
        } else {
            Self::Cooldown(Duration::from_secs(secs))
        }
    }
}

impl Default for InitRetryPolicy {
    fn default() -> Self {
        Self::Cooldown(Duration::from_secs(30))
    }
}

/// Components of an initialized pipeline
pub struct ReadyPipeline {
    /// Question retriever
    pub retriever: Retriever,
    /// Answer synthesizer, mode fixed
    pub synthesizer: Synthesizer,
}

impl ReadyPipeline {
    /// Synthesis mode selected at initialization
    pub fn mode(&self) -> SynthesisMode {
        self.synthesizer.mode()
    }

    /// Active vector store description
    pub fn vector_store(&self) -> String {
        self.retriever.index().descriptor()
    }
}

/// Builds the pipeline components
#[async_trait]
pub trait PipelineBuilder: Send + Sync {
    /// Ingest, index and select a synthesis mode
    async fn build(&self) -> Result<ReadyPipeline>;
}

/// Builds the pipeline from configuration against Ollama and the
/// configured vector store
pub struct OllamaPipelineBuilder {
    config: RagConfig,
}

impl OllamaPipelineBuilder {
    /// Create a builder for a configuration
    pub fn new(config: RagConfig) -> Self {
        Self { config }
    }

    /// Build with explicit providers
    pub async fn build_with(
        config: &RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Option<Arc<dyn LlmProvider>>,
    ) -> Result<ReadyPipeline> {
        let ingest = IngestPipeline::from_config(&config.chunking);
        let document = config.document.path.clone();

        let index = EmbeddingIndex::open(config, embedder, || ingest.ingest(&document)).await?;
        let index = Arc::new(index);
        tracing::info!("Vector store ready: {}", index.descriptor());

        let settings = SynthesisSettings::from_config(config);
        let synthesizer = match llm {
            Some(llm) if config.llm.enabled => {
                if llm.health_check().await.unwrap_or(false) {
                    tracing::info!("Using generative answers with {}", llm.model());
                    Synthesizer::generative(llm, settings)
                } else {
                    tracing::warn!(
                        "Model {} is unavailable, using extractive answers",
                        llm.model()
                    );
                    Synthesizer::extractive(settings)
                }
            }
            _ => {
                tracing::info!("Generative model disabled, using extractive answers");
                Synthesizer::extractive(settings)
            }
        };

        Ok(ReadyPipeline {
            retriever: Retriever::new(index, config.retrieval.top_k),
            synthesizer,
        })
    }
}

#[async_trait]
impl PipelineBuilder for OllamaPipelineBuilder {
    async fn build(&self) -> Result<ReadyPipeline> {
        let client = Arc::new(OllamaClient::new(&self.config.llm)?);
        let embedder: Arc<dyn EmbeddingProvider> =
            Arc::new(OllamaEmbedder::new(Arc::clone(&client), &self.config.embeddings));
        let llm: Arc<dyn LlmProvider> = Arc::new(OllamaLlm::new(client, &self.config.llm));

        Self::build_with(&self.config, embedder, Some(llm)).await
    }
}

enum InitFailure {
    CoolingDown,
    Failed(Error),
}

/// Single-flight pipeline initialization with a retry policy.
///
/// Success is memoized for the life of the state. Concurrent first callers
/// wait on one build.
pub struct PipelineState {
    cell: OnceCell<Arc<ReadyPipeline>>,
    builder: Arc<dyn PipelineBuilder>,
    policy: InitRetryPolicy,
    last_failure: Mutex<Option<Instant>>,
    attempts: AtomicUsize,
}

impl PipelineState {
    /// Create an uninitialized state
    pub fn new(builder: Arc<dyn PipelineBuilder>, policy: InitRetryPolicy) -> Self {
        Self {
            cell: OnceCell::new(),
            builder,
            policy,
            last_failure: Mutex::new(None),
            attempts: AtomicUsize::new(0),
        }
    }

    /// State backed by Ollama with the configured retry policy
    pub fn from_config(config: &RagConfig) -> Self {
        Self::new(
            Arc::new(OllamaPipelineBuilder::new(config.clone())),
            InitRetryPolicy::from_secs(config.pipeline.init_retry_cooldown_secs),
        )
    }

    /// Initialized pipeline, if any, without attempting initialization
    pub fn get(&self) -> Option<Arc<ReadyPipeline>> {
        self.cell.get().cloned()
    }

    /// Whether initialization has succeeded
    pub fn is_ready(&self) -> bool {
        self.cell.initialized()
    }

    /// Number of builds started so far
    pub fn init_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn cooling_down(&self) -> bool {
        match self.policy {
            InitRetryPolicy::Unconditional => false,
            InitRetryPolicy::Cooldown(window) => self
                .last_failure
                .lock()
                .is_some_and(|failed_at| failed_at.elapsed() < window),
        }
    }

    /// Initialize if needed. `None` means the pipeline is unavailable for
    /// this call; the failure has been logged.
    pub async fn ensure_ready(&self) -> Option<Arc<ReadyPipeline>> {
        if let Some(ready) = self.cell.get() {
            return Some(Arc::clone(ready));
        }

        let result = self
            .cell
            .get_or_try_init(|| async {
                // Re-checked here so callers queued behind a failed build
                // respect the cooldown too
                if self.cooling_down() {
                    return Err(InitFailure::CoolingDown);
                }

                self.attempts.fetch_add(1, Ordering::SeqCst);
                tracing::info!("Initializing RAG pipeline");
                let started = Instant::now();

                match self.builder.build().await {
                    Ok(ready) => {
                        tracing::info!(
                            "RAG pipeline ready in {:?} ({:?} mode)",
                            started.elapsed(),
                            ready.mode()
                        );
                        Ok(Arc::new(ready))
                    }
                    Err(e) => {
                        *self.last_failure.lock() = Some(Instant::now());
                        Err(InitFailure::Failed(e))
                    }
                }
            })
            .await;

        match result {
            Ok(ready) => Some(Arc::clone(ready)),
            Err(InitFailure::CoolingDown) => {
                tracing::debug!("Pipeline initialization cooling down after a failure");
                None
            }
            Err(InitFailure::Failed(e)) => {
                tracing::warn!("RAG pipeline initialization failed: {}", e);
                None
            }
        }
    }
}
