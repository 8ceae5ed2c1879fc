//! Document ingestion: page extraction and recursive chunking

mod chunker;
mod parser;
mod processor;

pub use chunker::TextChunker;
pub use parser::DocumentLoader;
pub use processor::IngestPipeline;
