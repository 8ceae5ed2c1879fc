//! Core types for the legal RAG pipeline

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, ChunkMetadata, Page};
pub use query::AskRequest;
pub use response::{
    Answer, AskResponse, GenerationMode, LegalQaResponse, PreloadResponse, SourceRef,
    StatusResponse, TestRagResponse,
};
