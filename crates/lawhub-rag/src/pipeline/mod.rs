//! Pipeline state and the fallback-chain orchestrator

pub mod orchestrator;
pub mod state;

pub use orchestrator::LegalPipeline;
pub use state::{
    InitRetryPolicy, OllamaPipelineBuilder, PipelineBuilder, PipelineState, ReadyPipeline,
};
