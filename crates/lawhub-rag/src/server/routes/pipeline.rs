//! Pipeline lifecycle endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::server::state::AppState;
use crate::types::{PreloadResponse, StatusResponse};

/// POST /api/preload_rag - Initialize the pipeline if it is not ready yet
pub async fn preload_rag(State(state): State<AppState>) -> (StatusCode, Json<PreloadResponse>) {
    tracing::info!("Manual RAG preload requested");
    let response = state.pipeline().preload().await;

    let status = if response.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(response))
}

/// GET /api/status - Pipeline readiness
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(state.pipeline().status())
}
