//! HTTP surface tests, driving the router in-process

mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use common::{pipeline_with, BrokenBuilder, LlmBehavior, StubBuilder};
use lawhub_rag::pipeline::PipelineBuilder;
use lawhub_rag::server::{state::AppState, RagServer};
use lawhub_rag::RagConfig;

fn router(builder: Arc<dyn PipelineBuilder>) -> Router {
    let config = RagConfig::default();
    let state = AppState::with_pipeline(Arc::new(pipeline_with(builder)));
    RagServer::with_state(config, state).router()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_plain_ok() {
    let app = router(Arc::new(BrokenBuilder));

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn ask_without_question_is_bad_request() {
    let app = router(Arc::new(BrokenBuilder));

    for body in ["{}", r#"{"question": "   "}"#, "not json"] {
        let response = app.clone().oneshot(post_json("/api/ask", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = json_body(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["type"], "validation_error");
    }
}

#[tokio::test]
async fn ask_answers_with_rule_based_fallback() {
    let app = router(Arc::new(BrokenBuilder));

    let response = app
        .oneshot(post_json(
            "/api/ask",
            r#"{"question": "My employer withheld my salary", "country": "Kenya"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["model"], "rule-based");
    assert_eq!(json["source"], "Rule-based system");
    assert_eq!(json["sources"].as_array().map(Vec::len), Some(0));
    assert!(json["answer"]
        .as_str()
        .unwrap()
        .contains("For Kenya-specific laws"));
}

#[tokio::test]
async fn ask_answers_from_the_index() {
    let app = router(Arc::new(StubBuilder::new(Some(LlmBehavior::Answer(
        "Step 1: 📝 Note the Article 14 guarantee.",
    )))));

    let response = app
        .oneshot(post_json(
            "/api/ask",
            r#"{"question": "Does the law treat everyone equally?"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["model"], "LLM + RAG");
    assert_eq!(json["source"], "RAG: Constitution of India");
    let first = &json["sources"][0];
    assert_eq!(first["source"], "constitution.txt");
    assert!(first["page"].as_u64().is_some());
}

#[tokio::test]
async fn ask_accepts_json_without_json_content_type() {
    let app = router(Arc::new(BrokenBuilder));

    let bare = Request::builder()
        .method("POST")
        .uri("/api/ask")
        .body(Body::from(r#"{"question":"My salary was not paid"}"#))
        .unwrap();
    let form = Request::builder()
        .method("POST")
        .uri("/api/legal_qa")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(r#"{"question":"My salary was not paid in India"}"#))
        .unwrap();

    for request in [bare, form] {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["success"], true);
        assert!(json["answer"]
            .as_str()
            .unwrap()
            .starts_with("💼 Employment Law Issue!"));
    }
}

#[tokio::test]
async fn compatibility_endpoints() {
    let app = router(Arc::new(StubBuilder::new(None)));

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/deepseek_legal",
            r#"{"question": "protection of personal liberty", "country": "Nepal"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["model"], "retrieval");

    let response = app.clone().oneshot(get("/api/test_rag")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "RAG pipeline test successful!");

    let response = app
        .oneshot(post_json("/api/chat_rag", r#"{"question": "equality before law"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn chat_rag_without_pipeline_is_server_error() {
    let app = router(Arc::new(BrokenBuilder));

    let response = app
        .clone()
        .oneshot(post_json("/api/chat_rag", r#"{"question": "equality before law"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["success"], false);

    let response = app.oneshot(post_json("/api/chat_rag", "{}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn legal_qa_reports_country() {
    let app = router(Arc::new(BrokenBuilder));

    let response = app
        .oneshot(post_json(
            "/api/legal_qa",
            r#"{"question": "Can I rent out land I own in Canada?"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["country"], "Canada");
    assert_eq!(json["question"], "Can I rent out land I own in Canada?");
    assert_eq!(json["model"], "rule-based");
    assert_eq!(json["supported_countries"].as_array().map(Vec::len), Some(10));
}

#[tokio::test]
async fn readiness_follows_preload() {
    let app = router(Arc::new(StubBuilder::new(None)));

    let response = app.clone().oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = app
        .clone()
        .oneshot(post_json("/api/preload_rag", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["success"], true);

    let response = app.clone().oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(app.oneshot(get("/api/status")).await.unwrap()).await;
    assert_eq!(json["status"], "online");
    assert_eq!(json["rag_pipeline"], "ready");
}

#[tokio::test]
async fn failed_preload_is_server_error() {
    let app = router(Arc::new(BrokenBuilder));

    let response = app
        .clone()
        .oneshot(post_json("/api/preload_rag", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = json_body(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "RAG pipeline preloading failed");

    let json = json_body(app.oneshot(get("/api/status")).await.unwrap()).await;
    assert_eq!(json["rag_pipeline"], "not ready");
    assert_eq!(json["features"].as_array().map(Vec::len), Some(5));
}
