//! LLM provider trait for prompt completion

use async_trait::async_trait;

use crate::error::Result;

/// Trait for generative text completion
///
/// Implementations:
/// - `OllamaLlm`: Local Ollama server (phi3, llama3, etc.)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete a fully rendered prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
