//! Answer and response types

use serde::{Deserialize, Serialize};

use super::document::Chunk;

/// Citation of a retrieved chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Source identifier
    pub source: String,
    /// Page number (1-indexed)
    pub page: u32,
}

impl SourceRef {
    /// Create a source reference from a chunk's provenance
    pub fn from_chunk(chunk: &Chunk) -> Self {
        Self {
            source: chunk.metadata.source_id.clone(),
            page: chunk.metadata.page_number,
        }
    }
}

/// How an answer was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Generative model over retrieved context
    Generative,
    /// Extractive bullet summary of retrieved context
    Extractive,
    /// Static rule-based advice
    RuleBased,
}

impl GenerationMode {
    /// Label reported in the `model` field
    pub fn model_label(&self) -> &'static str {
        match self {
            Self::Generative => "LLM + RAG",
            Self::Extractive => "retrieval",
            Self::RuleBased => "rule-based",
        }
    }

    /// User-facing status message
    pub fn message(&self) -> &'static str {
        match self {
            Self::Generative => "🤖 AI-powered answer from your knowledge base",
            Self::Extractive => "📚 Answered from your knowledge base",
            Self::RuleBased => "⚖️ Legal guidance provided",
        }
    }
}

/// A produced answer
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    /// Answer text including footers
    pub text: String,
    /// Cited chunks, in retrieval order
    pub sources: Vec<SourceRef>,
    /// How the answer was produced
    pub generation_mode: GenerationMode,
}

impl Answer {
    /// Rule-based answers carry no sources
    pub fn rule_based(text: String) -> Self {
        Self {
            text,
            sources: Vec::new(),
            generation_mode: GenerationMode::RuleBased,
        }
    }
}

/// Response to an ask request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    /// Always true for answered requests
    pub success: bool,
    /// Answer text
    pub answer: String,
    /// Cited pages
    pub sources: Vec<SourceRef>,
    /// Where the answer came from
    pub source: String,
    /// Generation mode label
    pub model: String,
    /// Status message
    pub message: String,
}

impl AskResponse {
    /// Build the wire response for an answer
    pub fn from_answer(answer: Answer, document_title: &str) -> Self {
        let source = match answer.generation_mode {
            GenerationMode::RuleBased => "Rule-based system".to_string(),
            _ => format!("RAG: {}", document_title),
        };

        Self {
            success: true,
            model: answer.generation_mode.model_label().to_string(),
            message: answer.generation_mode.message().to_string(),
            answer: answer.text,
            sources: answer.sources,
            source,
        }
    }
}

/// Response to a legal Q&A request, with detected country
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegalQaResponse {
    /// The base answer
    #[serde(flatten)]
    pub response: AskResponse,
    /// Echoed question
    pub question: String,
    /// Country detected from the question
    pub country: Option<String>,
    /// Countries the detector recognizes, in detection order
    pub supported_countries: Vec<String>,
}

/// Pipeline status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Always "online"
    pub status: String,
    /// Greeting
    pub message: String,
    /// "ready" or "not ready"
    pub rag_pipeline: String,
    /// Active vector store descriptor
    pub vector_store: String,
    /// Advertised features
    pub features: Vec<String>,
}

/// Result of the retrieval self-check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRagResponse {
    /// Always true for a completed check
    pub success: bool,
    /// Fixed question that was retrieved for
    pub test_question: String,
    /// Excerpt of the top retrieved chunks
    pub answer: String,
    /// Pages of the top retrieved chunks
    pub sources: Vec<SourceRef>,
    /// Status message
    pub message: String,
}

/// Result of an explicit preload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreloadResponse {
    /// Whether the pipeline is ready
    pub success: bool,
    /// Status message
    pub message: String,
}
