//! Application state for the server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::pipeline::LegalPipeline;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Question answering pipeline with its lazily built index
    pipeline: Arc<LegalPipeline>,
}

impl AppState {
    /// State with the default Ollama-backed pipeline
    pub fn new(config: &RagConfig) -> Self {
        Self::with_pipeline(Arc::new(LegalPipeline::from_config(config)))
    }

    /// State around an existing pipeline
    pub fn with_pipeline(pipeline: Arc<LegalPipeline>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { pipeline }),
        }
    }

    /// Get the pipeline
    pub fn pipeline(&self) -> &Arc<LegalPipeline> {
        &self.inner.pipeline
    }

    /// Whether the RAG pipeline has been initialized
    pub fn is_ready(&self) -> bool {
        self.inner.pipeline.state().is_ready()
    }
}
