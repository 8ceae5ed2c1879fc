//! API routes for the legal Q&A server

pub mod pipeline;
pub mod query;

use axum::{
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Question answering
        .route("/ask", post(query::ask))
        .route("/legal_qa", post(query::legal_qa))
        .route("/chat_rag", post(query::chat_rag))
        .route("/deepseek_legal", post(query::deepseek_legal))
        .route("/test_rag", get(query::test_rag))
        // Pipeline lifecycle
        .route("/preload_rag", post(pipeline::preload_rag))
        .route("/status", get(pipeline::status))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "lawhub-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Constitution-grounded legal Q&A with a rule-based fallback",
        "endpoints": {
            "POST /api/ask": "Answer a legal question (optional country hint)",
            "POST /api/legal_qa": "Answer a legal question with country detection",
            "POST /api/chat_rag": "Answer from the document only, no fallback",
            "POST /api/deepseek_legal": "Deprecated alias of /api/ask",
            "GET /api/test_rag": "Retrieval self-check",
            "POST /api/preload_rag": "Initialize the RAG pipeline now",
            "GET /api/status": "Pipeline readiness and vector store"
        }
    }))
}
