//! lawhub-rag: Constitution-grounded legal Q&A
//!
//! Answers legal questions from passages of one reference document. A
//! question is embedded and matched against a chunked, indexed copy of the
//! document; the best chunks are turned into an answer by a generative
//! model or, when no model is available, by extractive bullet selection.
//! Whenever retrieval or generation fails the question is answered by a
//! static rule-based advisor, so callers always get an answer.

pub mod advisor;
pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use pipeline::{LegalPipeline, PipelineState};
pub use types::{
    document::{Chunk, ChunkMetadata, Page},
    query::AskRequest,
    response::{Answer, AskResponse, GenerationMode, SourceRef},
};
