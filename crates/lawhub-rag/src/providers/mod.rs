//! Provider abstractions for embeddings, LLM and vector storage
//!
//! Trait-based seams that let the pipeline switch between the local flat
//! index and a remote Pinecone index, and let tests substitute stubs for
//! the Ollama server.

pub mod embedding;
pub mod llm;
pub mod local;
pub mod ollama;
pub mod pinecone;
pub mod vector_store;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use local::LocalVectorStore;
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaLlm};
pub use pinecone::PineconeVectorStore;
pub use vector_store::{VectorSearchResult, VectorStoreProvider};
