//! Fallback chain: generative or extractive RAG, then rule-based advice

use std::sync::Arc;

use crate::advisor::{detect_country, supported_countries, Advisor, RuleBasedAdvisor};
use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::types::{
    Answer, AskRequest, AskResponse, LegalQaResponse, PreloadResponse, SourceRef,
    StatusResponse, TestRagResponse,
};

use super::state::PipelineState;

/// Features advertised by the status endpoint
const FEATURES: &[&str] = &[
    "Legal Q&A with AI",
    "Document search",
    "Multi-country support",
    "Rule-based legal guidance fallback",
    "Pinecone vector search (if configured)",
];

/// Chunks excerpted by the retrieval self-check
const TEST_CHUNKS: usize = 2;

/// Characters of excerpt returned by the retrieval self-check
const TEST_EXCERPT_CHARS: usize = 500;

/// Answers questions, degrading through the fallback chain so that every
/// non-empty question gets an answer
pub struct LegalPipeline {
    state: Arc<PipelineState>,
    advisor: Arc<dyn Advisor>,
    document_title: String,
    configured_store: String,
}

impl LegalPipeline {
    /// Create a pipeline over shared state
    pub fn new(state: Arc<PipelineState>, advisor: Arc<dyn Advisor>, config: &RagConfig) -> Self {
        let configured_store = match config.remote_index() {
            Some(pinecone) => format!("Pinecone ({})", pinecone.index_name),
            None => format!("Local index ({})", config.vector_db.persist_dir.display()),
        };

        Self {
            state,
            advisor,
            document_title: config.document.title.clone(),
            configured_store,
        }
    }

    /// Pipeline backed by Ollama and the rule-based advisor
    pub fn from_config(config: &RagConfig) -> Self {
        Self::new(
            Arc::new(PipelineState::from_config(config)),
            Arc::new(RuleBasedAdvisor::new()),
            config,
        )
    }

    /// Shared pipeline state
    pub fn state(&self) -> &Arc<PipelineState> {
        &self.state
    }

    /// Answer a question. Only an empty question is rejected.
    pub async fn ask(&self, request: &AskRequest) -> Result<AskResponse> {
        let question = request.question();
        if question.is_empty() {
            return Err(Error::validation("No question provided"));
        }

        tracing::info!("Question received ({} chars)", question.chars().count());
        let answer = self.answer(question, request.country()).await;
        tracing::info!("Answered in {:?} mode", answer.generation_mode);

        Ok(AskResponse::from_answer(answer, &self.document_title))
    }

    /// Like [`ask`](Self::ask) but the country always comes from the question
    pub async fn legal_qa(&self, question: &str) -> Result<LegalQaResponse> {
        let question = question.trim();
        let country = detect_country(question);

        let mut request = AskRequest::new(question);
        if let Some(country) = country {
            request = request.with_country(country);
        }
        let response = self.ask(&request).await?;

        Ok(LegalQaResponse {
            response,
            question: question.to_string(),
            country: country.map(str::to_string),
            supported_countries: supported_countries(),
        })
    }

    /// Answer from the document only, without the rule-based fallback.
    /// Initialization, retrieval and synthesis failures are returned.
    pub async fn chat_rag(&self, question: &str) -> Result<AskResponse> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::validation("No question provided"));
        }

        let ready = self.state.ensure_ready().await.ok_or_else(|| {
            Error::internal("RAG pipeline failed to initialize. Check logs and config.")
        })?;
        let chunks = ready.retriever.retrieve(question).await?;
        if chunks.is_empty() {
            return Err(Error::Retrieval("No relevant chunks found".to_string()));
        }
        let answer = ready.synthesizer.synthesize(question, &chunks).await?;

        Ok(AskResponse::from_answer(answer, &self.document_title))
    }

    /// Retrieve for a fixed question and return an excerpt of the best
    /// chunks, to check the index end to end
    pub async fn test_rag(&self) -> Result<TestRagResponse> {
        let ready = self
            .state
            .ensure_ready()
            .await
            .ok_or_else(|| Error::internal("RAG pipeline failed to initialize"))?;

        let test_question = format!("What is the {}?", self.document_title);
        let chunks = ready.retriever.retrieve(&test_question).await?;
        let top = &chunks[..chunks.len().min(TEST_CHUNKS)];

        let answer = if top.is_empty() {
            "No relevant documents found".to_string()
        } else {
            let combined = top
                .iter()
                .map(|c| c.chunk.text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n");
            let excerpt: String = combined.chars().take(TEST_EXCERPT_CHARS).collect();
            format!("{} - Test Results:\n\n{}...", self.document_title, excerpt)
        };

        Ok(TestRagResponse {
            success: true,
            test_question,
            answer,
            sources: top.iter().map(|c| SourceRef::from_chunk(&c.chunk)).collect(),
            message: "RAG pipeline test successful!".to_string(),
        })
    }

    async fn answer(&self, question: &str, country: Option<&str>) -> Answer {
        let Some(ready) = self.state.ensure_ready().await else {
            tracing::warn!("RAG pipeline unavailable, using rule-based advice");
            return self.rule_based(question, country);
        };

        let chunks = match ready.retriever.retrieve(question).await {
            Ok(chunks) if chunks.is_empty() => {
                tracing::warn!("No relevant chunks found, using rule-based advice");
                return self.rule_based(question, country);
            }
            Ok(chunks) => chunks,
            Err(e) => {
                tracing::warn!("Retrieval failed, using rule-based advice: {}", e);
                return self.rule_based(question, country);
            }
        };

        match ready.synthesizer.synthesize(question, &chunks).await {
            Ok(answer) => answer,
            Err(Error::DegenerateGeneration) => {
                tracing::warn!("Model echoed its prompt template, using rule-based advice");
                self.rule_based(question, country)
            }
            Err(e) => {
                tracing::warn!("Synthesis failed, using rule-based advice: {}", e);
                self.rule_based(question, country)
            }
        }
    }

    fn rule_based(&self, question: &str, country: Option<&str>) -> Answer {
        Answer::rule_based(self.advisor.advise(question, country))
    }

    /// Initialize the pipeline now. Idempotent.
    pub async fn preload(&self) -> PreloadResponse {
        match self.state.ensure_ready().await {
            Some(_) => PreloadResponse {
                success: true,
                message: "RAG pipeline preloaded successfully! 🚀".to_string(),
            },
            None => PreloadResponse {
                success: false,
                message: "RAG pipeline preloading failed".to_string(),
            },
        }
    }

    /// Report readiness and the active vector store
    pub fn status(&self) -> StatusResponse {
        let ready = self.state.get();

        StatusResponse {
            status: "online".to_string(),
            message: "LawHub API is running! 🚀".to_string(),
            rag_pipeline: if ready.is_some() { "ready" } else { "not ready" }.to_string(),
            vector_store: ready
                .map(|r| r.vector_store())
                .unwrap_or_else(|| self.configured_store.clone()),
            features: FEATURES.iter().map(|f| f.to_string()).collect(),
        }
    }
}
