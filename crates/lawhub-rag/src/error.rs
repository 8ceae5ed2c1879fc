//! Error types for the legal RAG pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
///
/// Only [`Error::Validation`] ever reaches an HTTP caller from the ask path;
/// everything else is absorbed by the fallback chain.
#[derive(Debug, Error)]
pub enum Error {
    /// Rejected request (empty question)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source document missing or unreadable
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Index could not be built or loaded
    #[error("Index build failed: {0}")]
    IndexBuild(String),

    /// Similarity query failed
    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Vector store error
    #[error("Vector store error: {0}")]
    VectorDb(String),

    /// Generative model failure (transport, timeout, malformed output)
    #[error("Generation failed: {0}")]
    Generation(String),

    /// The model echoed its prompt template instead of answering
    #[error("Degenerate generation detected")]
    DegenerateGeneration,

    /// Synthesis requested in a mode the pipeline was not initialized for
    #[error("Unknown pipeline mode: {0}")]
    UnknownPipelineMode(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an index build error
    pub fn index_build(message: impl Into<String>) -> Self {
        Self::IndexBuild(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a vector store error
    pub fn vector_db(message: impl Into<String>) -> Self {
        Self::VectorDb(message.into())
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether this failure happened while generating an answer.
    ///
    /// `UnknownPipelineMode` is grouped with generation failures.
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            Error::Generation(_) | Error::DegenerateGeneration | Error::UnknownPipelineMode(_)
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            Error::Config(msg) => (StatusCode::BAD_REQUEST, "config_error", msg.clone()),
            Error::DocumentNotFound(path) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("Document not found: {}", path),
            ),
            Error::IndexBuild(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "index_error", msg.clone())
            }
            Error::Retrieval(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "retrieval_error", msg.clone())
            }
            Error::Embedding(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "embedding_error", msg.clone())
            }
            Error::VectorDb(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "vector_db_error", msg.clone())
            }
            Error::Generation(msg) => (StatusCode::SERVICE_UNAVAILABLE, "llm_error", msg.clone()),
            Error::DegenerateGeneration => (
                StatusCode::SERVICE_UNAVAILABLE,
                "llm_error",
                self.to_string(),
            ),
            Error::UnknownPipelineMode(mode) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "pipeline_error",
                format!("Unknown pipeline mode: {}", mode),
            ),
            Error::Io(err) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error", err.to_string()),
            Error::Json(err) => (StatusCode::BAD_REQUEST, "json_error", err.to_string()),
            Error::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
        };

        let body = Json(json!({
            "success": false,
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
