//! Synthesis mode chosen at initialization against a mock Ollama server

mod common;

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use serde_json::{json, Value};

use common::{LetterEmbedder, DIMENSIONS};
use lawhub_rag::config::RagConfig;
use lawhub_rag::generation::SynthesisMode;
use lawhub_rag::pipeline::OllamaPipelineBuilder;
use lawhub_rag::providers::{LlmProvider, OllamaClient, OllamaLlm};
use lawhub_rag::types::GenerationMode;

/// Serve `/api/tags` with the given models; `/api/generate` answers only
/// for installed models
async fn serve_ollama(installed: Vec<&'static str>) -> String {
    async fn tags(State(installed): State<Arc<Vec<&'static str>>>) -> Json<Value> {
        let models: Vec<Value> = installed.iter().map(|name| json!({ "name": name })).collect();
        Json(json!({ "models": models }))
    }

    async fn generate(
        State(installed): State<Arc<Vec<&'static str>>>,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let model = body["model"].as_str().unwrap_or_default().to_string();
        if installed.iter().any(|name| name.split(':').next() == Some(model.as_str())) {
            (
                StatusCode::OK,
                Json(json!({ "response": "Step 1: 📝 Read Article 21.", "done": true })),
            )
        } else {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("model '{}' not found", model) })),
            )
        }
    }

    let app = Router::new()
        .route("/api/tags", get(tags))
        .route("/api/generate", post(generate))
        .with_state(Arc::new(installed));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn config_for(base_url: String, dir: &tempfile::TempDir) -> RagConfig {
    let document = dir.path().join("constitution.txt");
    let text = common::constitution_pages()
        .into_iter()
        .map(|page| page.text)
        .collect::<Vec<_>>()
        .join("\u{000C}");
    std::fs::write(&document, text).unwrap();

    let mut config = RagConfig::default();
    config.document.path = document;
    config.embeddings.dimensions = DIMENSIONS;
    config.vector_db.persist_dir = dir.path().join("store");
    config.llm.base_url = base_url;
    config
}

async fn build(config: &RagConfig) -> lawhub_rag::pipeline::ReadyPipeline {
    let client = Arc::new(OllamaClient::new(&config.llm).unwrap());
    let llm: Arc<dyn LlmProvider> = Arc::new(OllamaLlm::new(client, &config.llm));
    let embedder = Arc::new(LetterEmbedder {
        fail_queries: false,
    });
    OllamaPipelineBuilder::build_with(config, embedder, Some(llm))
        .await
        .unwrap()
}

#[tokio::test]
async fn missing_generate_model_selects_extractive() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(serve_ollama(vec!["all-minilm:latest"]).await, &dir);

    let ready = build(&config).await;
    assert_eq!(ready.mode(), SynthesisMode::Extractive);

    let question = "personal liberty protection";
    let chunks = ready.retriever.retrieve(question).await.unwrap();
    let answer = ready.synthesizer.synthesize(question, &chunks).await.unwrap();
    assert_eq!(answer.generation_mode, GenerationMode::Extractive);
}

#[tokio::test]
async fn installed_generate_model_selects_generative() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(
        serve_ollama(vec!["all-minilm:latest", "phi3:latest"]).await,
        &dir,
    );

    let ready = build(&config).await;
    assert_eq!(ready.mode(), SynthesisMode::Generative);

    let question = "personal liberty protection";
    let chunks = ready.retriever.retrieve(question).await.unwrap();
    let answer = ready.synthesizer.synthesize(question, &chunks).await.unwrap();
    assert_eq!(answer.generation_mode, GenerationMode::Generative);
    assert!(answer.text.starts_with("Step 1: 📝 Read Article 21."));
}

#[tokio::test]
async fn disabled_model_selects_extractive() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(
        serve_ollama(vec!["all-minilm:latest", "phi3:latest"]).await,
        &dir,
    );
    config.llm.enabled = false;

    assert_eq!(build(&config).await.mode(), SynthesisMode::Extractive);
}
