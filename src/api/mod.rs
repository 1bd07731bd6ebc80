//! HTTP surface: a small JSON API over the pipeline.

pub mod chat;
pub mod ingest;
pub mod search;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/chat", post(chat::chat))
        .route("/api/search", post(search::search))
        .route("/api/ingest", post(ingest::ingest))
        .route("/api/status", get(ingest::status))
        .with_state(state)
}
