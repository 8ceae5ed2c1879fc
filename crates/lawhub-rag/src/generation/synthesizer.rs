//! Answer synthesis from retrieved chunks

use std::sync::Arc;
use std::time::Duration;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::providers::LlmProvider;
use crate::retrieval::{RelevanceFilter, RetrievedChunk};
use crate::types::{Answer, GenerationMode};

use super::citation::{collect_sources, with_footers};
use super::guard::is_degenerate;
use super::prompt::PromptBuilder;

/// Synthesis strategy, fixed when the pipeline is initialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisMode {
    /// Prompt a generative model with retrieved context
    Generative,
    /// Bullet the most relevant retrieved lines
    Extractive,
}

impl SynthesisMode {
    /// Mode reported on answers
    pub fn generation_mode(&self) -> GenerationMode {
        match self {
            Self::Generative => GenerationMode::Generative,
            Self::Extractive => GenerationMode::Extractive,
        }
    }
}

/// Limits and labels used while composing answers
#[derive(Debug, Clone)]
pub struct SynthesisSettings {
    /// Title used in prompts and footers
    pub document_title: String,
    /// Chunks fed to the model and cited
    pub context_chunks: usize,
    /// Chunks scanned for extractive lines
    pub extractive_chunks: usize,
    /// Bullets in an extractive answer
    pub extractive_bullets: usize,
    /// Line limit of the relevance filter
    pub max_lines: usize,
    /// Bound on one generation call
    pub generation_timeout: Duration,
}

impl SynthesisSettings {
    /// Settings from configuration
    pub fn from_config(config: &RagConfig) -> Self {
        Self {
            document_title: config.document.title.clone(),
            context_chunks: config.retrieval.context_chunks,
            extractive_chunks: config.retrieval.extractive_chunks,
            extractive_bullets: config.retrieval.extractive_bullets,
            max_lines: config.retrieval.max_lines,
            generation_timeout: config.llm.generation_timeout(),
        }
    }
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self::from_config(&RagConfig::default())
    }
}

/// Composes answers in one fixed mode
pub struct Synthesizer {
    mode: SynthesisMode,
    llm: Option<Arc<dyn LlmProvider>>,
    settings: SynthesisSettings,
}

impl Synthesizer {
    /// Create a synthesizer. Generative mode needs a model.
    pub fn new(
        mode: SynthesisMode,
        llm: Option<Arc<dyn LlmProvider>>,
        settings: SynthesisSettings,
    ) -> Self {
        Self {
            mode,
            llm,
            settings,
        }
    }

    /// Generative synthesizer over a model
    pub fn generative(llm: Arc<dyn LlmProvider>, settings: SynthesisSettings) -> Self {
        Self::new(SynthesisMode::Generative, Some(llm), settings)
    }

    /// Extractive synthesizer
    pub fn extractive(settings: SynthesisSettings) -> Self {
        Self::new(SynthesisMode::Extractive, None, settings)
    }

    /// Active mode
    pub fn mode(&self) -> SynthesisMode {
        self.mode
    }

    /// Compose an answer from chunks ordered best first
    pub async fn synthesize(&self, question: &str, chunks: &[RetrievedChunk]) -> Result<Answer> {
        if chunks.is_empty() {
            return Err(Error::Retrieval("No chunks to answer from".to_string()));
        }

        match self.mode {
            SynthesisMode::Generative => {
                let llm = self.llm.as_ref().ok_or_else(|| {
                    Error::UnknownPipelineMode("generative mode without a model".to_string())
                })?;
                self.generate(llm.as_ref(), question, chunks).await
            }
            SynthesisMode::Extractive => self.extract(question, chunks),
        }
    }

    async fn generate(
        &self,
        llm: &dyn LlmProvider,
        question: &str,
        chunks: &[RetrievedChunk],
    ) -> Result<Answer> {
        let cited = &chunks[..chunks.len().min(self.settings.context_chunks)];
        let context = PromptBuilder::build_context(cited);
        let prompt =
            PromptBuilder::build_legal_prompt(&self.settings.document_title, question, &context);

        tracing::debug!("Generating answer with {} ({})", llm.name(), llm.model());

        let output = tokio::time::timeout(self.settings.generation_timeout, llm.generate(&prompt))
            .await
            .map_err(|_| {
                Error::generation(format!(
                    "Generation timed out after {:?}",
                    self.settings.generation_timeout
                ))
            })??;

        let text = output.trim();
        if text.is_empty() {
            return Err(Error::generation("Model returned an empty answer"));
        }
        if is_degenerate(text) {
            return Err(Error::DegenerateGeneration);
        }

        let sources = collect_sources(cited);
        Ok(Answer {
            text: with_footers(text, &self.settings.document_title, &sources),
            sources,
            generation_mode: GenerationMode::Generative,
        })
    }

    fn extract(&self, question: &str, chunks: &[RetrievedChunk]) -> Result<Answer> {
        let scanned: Vec<_> = chunks
            .iter()
            .take(self.settings.extractive_chunks)
            .map(|retrieved| retrieved.chunk.clone())
            .collect();

        let mut lines =
            RelevanceFilter::new(self.settings.max_lines).filter_and_score(question, &scanned);
        if lines.is_empty() {
            return Err(Error::generation("No usable lines in retrieved chunks"));
        }
        lines.truncate(self.settings.extractive_bullets);

        let body = PromptBuilder::build_extractive_answer(&self.settings.document_title, &lines);
        let cited = &chunks[..chunks.len().min(self.settings.context_chunks)];
        let sources = collect_sources(cited);

        Ok(Answer {
            text: with_footers(&body, &self.settings.document_title, &sources),
            sources,
            generation_mode: GenerationMode::Extractive,
        })
    }
}
