//! Question answering endpoints

use axum::{body::Bytes, extract::State, Json};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{AskRequest, AskResponse, LegalQaResponse, TestRagResponse};

/// Parse a JSON body whatever its content type. A missing or malformed
/// body is treated as an empty question.
fn parse_request(body: &[u8]) -> AskRequest {
    serde_json::from_slice(body).unwrap_or_else(|e| {
        if !body.is_empty() {
            tracing::debug!("Unreadable request body: {}", e);
        }
        AskRequest::default()
    })
}

/// POST /api/ask - Answer a question, falling back to rule-based advice
pub async fn ask(State(state): State<AppState>, body: Bytes) -> Result<Json<AskResponse>> {
    let request = parse_request(&body);
    let response = state.pipeline().ask(&request).await?;
    Ok(Json(response))
}

/// POST /api/deepseek_legal - Deprecated mirror of `/api/ask` without a
/// country hint
pub async fn deepseek_legal(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AskResponse>> {
    let request = AskRequest::new(parse_request(&body).question);
    let response = state.pipeline().ask(&request).await?;
    Ok(Json(response))
}

/// POST /api/chat_rag - Answer from the document only; failures are errors
pub async fn chat_rag(State(state): State<AppState>, body: Bytes) -> Result<Json<AskResponse>> {
    let request = parse_request(&body);
    let response = state.pipeline().chat_rag(&request.question).await?;
    Ok(Json(response))
}

/// GET /api/test_rag - Retrieval self-check
pub async fn test_rag(State(state): State<AppState>) -> Result<Json<TestRagResponse>> {
    Ok(Json(state.pipeline().test_rag().await?))
}

/// POST /api/legal_qa - Answer with the country detected from the question
pub async fn legal_qa(State(state): State<AppState>, body: Bytes) -> Result<Json<LegalQaResponse>> {
    let request = parse_request(&body);
    let response = state.pipeline().legal_qa(&request.question).await?;
    Ok(Json(response))
}
