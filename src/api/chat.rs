//! `POST /api/chat` — answer one question through the full pipeline.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use crate::models::{AnswerResult, ChatRequest};
use crate::state::AppState;

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<AnswerResult>, (StatusCode, String)> {
    if request.message.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "message must not be empty".into()));
    }

    // One generation at a time; queued requests wait here.
    let _permit = state.chat_permits.acquire().await.map_err(|_| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "server shutting down".to_string(),
        )
    })?;

    tracing::info!("Chat request: {}", request.message);

    let result = state.engine.respond(&request.message).await.map_err(|e| {
        tracing::error!("Chat failed: {e:#}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("answer generation failed: {e:#}"),
        )
    })?;

    Ok(Json(result))
}
