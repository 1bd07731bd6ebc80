//! `POST /api/search` — raw retrieval results without answer synthesis.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::models::{ScoredChunk, SearchRequest};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<ScoredChunk>,
    pub count: usize,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    if request.query.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "query must not be empty".into()));
    }

    let results = state
        .retriever
        .search(&request.query, request.search_type, request.filters.as_ref())
        .await
        .map_err(|e| {
            tracing::error!("Search failed: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("search failed: {e:#}"),
            )
        })?;

    Ok(Json(SearchResponse {
        count: results.len(),
        results,
    }))
}
