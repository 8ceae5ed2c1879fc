//! Ollama client and the provider implementations built on it

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::llm::LlmProvider;

/// Retries for embedding requests; generation is never retried
const EMBED_MAX_RETRIES: u32 = 2;

/// Ollama API client
pub struct OllamaClient {
    /// HTTP client
    client: Client,
    /// Server base URL without trailing slash
    base_url: String,
    /// Sampling temperature for generation
    temperature: f32,
    /// Token cap for generation
    max_tokens: u32,
    /// Per-request bound on generation calls
    generation_timeout: Duration,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

/// Whether an installed model name refers to `model`. Ollama reports
/// untagged pulls as `name:latest`.
fn model_matches(installed: &str, model: &str) -> bool {
    installed == model
        || (!model.contains(':') && installed.strip_suffix(":latest") == Some(model))
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            generation_timeout: config.generation_timeout(),
        })
    }

    /// Check if Ollama is reachable
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                tracing::debug!("Ollama health check failed: {}", e);
                Ok(false)
            }
        }
    }

    /// Check that Ollama is reachable and has `model` installed
    pub async fn has_model(&self, model: &str) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);

        let response = match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::debug!("Ollama tags request returned HTTP {}", response.status());
                return Ok(false);
            }
            Err(e) => {
                tracing::debug!("Ollama health check failed: {}", e);
                return Ok(false);
            }
        };

        let tags: TagsResponse = match response.json().await {
            Ok(tags) => tags,
            Err(e) => {
                tracing::debug!("Unreadable Ollama tags response: {}", e);
                return Ok(false);
            }
        };

        let installed = tags.models.iter().any(|m| model_matches(&m.name, model));
        if !installed {
            tracing::warn!("Model {} is not installed on {}", model, self.base_url);
        }
        Ok(installed)
    }

    /// Generate an embedding, retrying transient failures with backoff
    pub async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        let mut last_error = None;

        for attempt in 0..=EMBED_MAX_RETRIES {
            match self.embed_once(model, text).await {
                Ok(embedding) => return Ok(embedding),
                Err(e) => {
                    last_error = Some(e);
                    if attempt < EMBED_MAX_RETRIES {
                        let delay = Duration::from_millis(250 * 2u64.pow(attempt));
                        tracing::warn!(
                            "Embedding request failed (attempt {}/{}), retrying in {:?}",
                            attempt + 1,
                            EMBED_MAX_RETRIES + 1,
                            delay
                        );
                        sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::embedding("Unknown error")))
    }

    async fn embed_once(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let request = EmbedRequest {
            model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::embedding(format!("Embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::embedding(format!(
                "Embedding failed: HTTP {}",
                response.status()
            )));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("Failed to parse embedding response: {}", e)))?;

        if embed_response.embedding.is_empty() {
            return Err(Error::embedding("Ollama returned an empty embedding"));
        }

        Ok(embed_response.embedding)
    }

    /// Complete a prompt in a single non-streaming call
    pub async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        };

        tracing::debug!("Generating with model {} ({} prompt chars)", model, prompt.len());

        let response = self
            .client
            .post(&url)
            .timeout(self.generation_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::generation(format!("Generation request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::generation(format!(
                "Generation failed: HTTP {} - {}",
                status, body
            )));
        }

        let generate_response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::generation(format!("Failed to parse generation response: {}", e)))?;

        Ok(generate_response.response)
    }
}

/// Ollama embedding provider
pub struct OllamaEmbedder {
    client: Arc<OllamaClient>,
    model: String,
    dimensions: usize,
}

impl OllamaEmbedder {
    /// Create from a shared client
    pub fn new(client: Arc<OllamaClient>, config: &EmbeddingConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            dimensions: config.dimensions,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(&self.model, text).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Ollama LLM provider for answer generation
pub struct OllamaLlm {
    client: Arc<OllamaClient>,
    model: String,
}

impl OllamaLlm {
    /// Create from a shared client
    pub fn new(client: Arc<OllamaClient>, config: &LlmConfig) -> Self {
        Self {
            client,
            model: config.generate_model.clone(),
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.client.generate(&self.model, prompt).await
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.has_model(&self.model).await
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_config() -> LlmConfig {
        LlmConfig {
            base_url: "http://127.0.0.1:9/".to_string(),
            timeout_secs: 2,
            ..LlmConfig::default()
        }
    }

    #[test]
    fn test_generate_request_shape() {
        let request = GenerateRequest {
            model: "phi3",
            prompt: "Hello",
            stream: false,
            options: GenerateOptions {
                temperature: 0.7,
                num_predict: 512,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "phi3");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 512);
    }

    #[test]
    fn test_model_matches_latest_tag() {
        assert!(model_matches("phi3:latest", "phi3"));
        assert!(model_matches("phi3:mini", "phi3:mini"));
        assert!(!model_matches("phi3:mini", "phi3"));
        assert!(!model_matches("phi3:latest", "phi3:mini"));
        assert!(!model_matches("all-minilm:latest", "phi3"));
    }

    /// Serve a fixed `/api/tags` body on an ephemeral port
    async fn serve_tags(body: serde_json::Value) -> String {
        use axum::{routing::get, Json, Router};

        let app = Router::new().route("/api/tags", get(move || async move { Json(body) }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_llm_unhealthy_without_generate_model() {
        let base_url = serve_tags(serde_json::json!({
            "models": [{"name": "all-minilm:latest"}]
        }))
        .await;
        let config = LlmConfig {
            base_url,
            ..LlmConfig::default()
        };
        let client = Arc::new(OllamaClient::new(&config).unwrap());

        // Server is up, so embeddings are fine; generation is not
        assert!(client.health_check().await.unwrap());
        let llm = OllamaLlm::new(Arc::clone(&client), &config);
        assert!(!llm.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_llm_healthy_with_generate_model() {
        let base_url = serve_tags(serde_json::json!({
            "models": [{"name": "all-minilm:latest"}, {"name": "phi3:latest"}]
        }))
        .await;
        let config = LlmConfig {
            base_url,
            ..LlmConfig::default()
        };
        let llm = OllamaLlm::new(Arc::new(OllamaClient::new(&config).unwrap()), &config);
        assert!(llm.health_check().await.unwrap());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = OllamaClient::new(&unreachable_config()).unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:9");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unhealthy() {
        let client = Arc::new(OllamaClient::new(&unreachable_config()).unwrap());
        let llm = OllamaLlm::new(Arc::clone(&client), &LlmConfig::default());
        assert!(!llm.health_check().await.unwrap());

        let err = llm.generate("prompt").await.unwrap_err();
        assert!(err.is_generation_failure());
    }
}
