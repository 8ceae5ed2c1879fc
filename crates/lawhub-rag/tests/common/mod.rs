//! In-process stand-ins for Ollama and the document, shared by the
//! integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lawhub_rag::advisor::RuleBasedAdvisor;
use lawhub_rag::error::{Error, Result};
use lawhub_rag::generation::{SynthesisSettings, Synthesizer};
use lawhub_rag::ingestion::IngestPipeline;
use lawhub_rag::pipeline::{
    InitRetryPolicy, LegalPipeline, PipelineBuilder, PipelineState, ReadyPipeline,
};
use lawhub_rag::providers::{EmbeddingProvider, LlmProvider, LocalVectorStore};
use lawhub_rag::retrieval::{EmbeddingIndex, Retriever};
use lawhub_rag::types::Page;
use lawhub_rag::RagConfig;

pub const DIMENSIONS: usize = 26;

/// A few pages in the shape of the constitution, one line per provision
pub fn constitution_pages() -> Vec<Page> {
    vec![
        Page::new(
            "PART III\nFUNDAMENTAL RIGHTS\nArticle 14. Equality before law.\nThe State shall not deny to any person equality before the law.",
            1,
            "constitution.txt",
        ),
        Page::new(
            "Article 21. Protection of life and personal liberty.\nNo person shall be deprived of his life or personal liberty except according to procedure established by law.\nअनुच्छेद 21. प्राण और दैहिक स्वतंत्रता का संरक्षण",
            2,
            "constitution.txt",
        ),
        Page::new(
            "Article 22. Protection against arrest and detention in certain cases.\nNo person who is arrested shall be detained in custody without being informed of the grounds for such arrest.",
            3,
            "constitution.txt",
        ),
    ]
}

/// Bag-of-letters embedder; deterministic, no network
pub struct LetterEmbedder {
    pub fail_queries: bool,
}

#[async_trait]
impl EmbeddingProvider for LetterEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.fail_queries {
            return Err(Error::embedding("embedding server went away"));
        }
        let mut v = vec![0.0; DIMENSIONS];
        for c in text.to_lowercase().chars().filter(|c| c.is_ascii_lowercase()) {
            v[(c as u8 - b'a') as usize] += 1.0;
        }
        Ok(v)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            let mut v = vec![0.0; DIMENSIONS];
            for c in text.to_lowercase().chars().filter(|c| c.is_ascii_lowercase()) {
                v[(c as u8 - b'a') as usize] += 1.0;
            }
            out.push(v);
        }
        Ok(out)
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.fail_queries)
    }

    fn name(&self) -> &str {
        "letters"
    }
}

/// How the stub model replies
#[derive(Clone)]
pub enum LlmBehavior {
    /// A well-formed answer
    Answer(&'static str),
    /// Repeat the prompt back
    Echo,
    /// Transport failure
    Fail,
    /// Never answer within the timeout
    Hang,
}

pub struct StubLlm {
    pub behavior: LlmBehavior,
}

#[async_trait]
impl LlmProvider for StubLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        match &self.behavior {
            LlmBehavior::Answer(text) => Ok(text.to_string()),
            LlmBehavior::Echo => Ok(prompt.to_string()),
            LlmBehavior::Fail => Err(Error::generation("connection reset by peer")),
            LlmBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok("too late".to_string())
            }
        }
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "stub"
    }

    fn model(&self) -> &str {
        "stub-model"
    }
}

/// Builds the pipeline from the in-memory pages, counting builds
pub struct StubBuilder {
    pub llm: Option<LlmBehavior>,
    pub pages: Vec<Page>,
    pub fail_queries: bool,
    pub build_delay: Duration,
    pub builds: AtomicUsize,
}

impl StubBuilder {
    pub fn new(llm: Option<LlmBehavior>) -> Self {
        Self {
            llm,
            pages: constitution_pages(),
            fail_queries: false,
            build_delay: Duration::ZERO,
            builds: AtomicUsize::new(0),
        }
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PipelineBuilder for StubBuilder {
    async fn build(&self) -> Result<ReadyPipeline> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.build_delay).await;

        let embedder = Arc::new(LetterEmbedder {
            fail_queries: false,
        });
        let store = Arc::new(LocalVectorStore::new(std::env::temp_dir(), DIMENSIONS));
        let chunks = IngestPipeline::default().create_chunks(&self.pages);
        let index = if self.pages.is_empty() {
            EmbeddingIndex::new(embedder, store)
        } else {
            EmbeddingIndex::build(chunks, embedder, store).await?
        };

        // Indexing used a healthy embedder; queries may use a broken one
        let index = if self.fail_queries {
            let store = Arc::new(LocalVectorStore::new(std::env::temp_dir(), DIMENSIONS));
            EmbeddingIndex::new(Arc::new(LetterEmbedder { fail_queries: true }), store)
        } else {
            index
        };

        let settings = SynthesisSettings {
            generation_timeout: Duration::from_millis(200),
            ..SynthesisSettings::default()
        };
        let synthesizer = match &self.llm {
            Some(behavior) => Synthesizer::generative(
                Arc::new(StubLlm {
                    behavior: behavior.clone(),
                }),
                settings,
            ),
            None => Synthesizer::extractive(settings),
        };

        Ok(ReadyPipeline {
            retriever: Retriever::new(Arc::new(index), 6),
            synthesizer,
        })
    }
}

/// Never builds
pub struct BrokenBuilder;

#[async_trait]
impl PipelineBuilder for BrokenBuilder {
    async fn build(&self) -> Result<ReadyPipeline> {
        Err(Error::DocumentNotFound("data/constitution.pdf".to_string()))
    }
}

pub fn pipeline_with(builder: Arc<dyn PipelineBuilder>) -> LegalPipeline {
    let state = Arc::new(PipelineState::new(builder, InitRetryPolicy::Unconditional));
    LegalPipeline::new(state, Arc::new(RuleBasedAdvisor::new()), &RagConfig::default())
}
