//! `POST /api/ingest` and `GET /api/status` — index lifecycle endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::ingest::run_ingestion;
use crate::models::IngestReport;
use crate::state::{AppState, PipelineState};

#[derive(Debug, Default, Deserialize)]
pub struct IngestParams {
    #[serde(default)]
    pub force_refresh: bool,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub state: &'static str,
}

pub async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(params): Json<IngestParams>,
) -> Result<Json<IngestReport>, (StatusCode, String)> {
    if state.pipeline_state() == PipelineState::Loading {
        return Err((
            StatusCode::CONFLICT,
            "an ingestion run is already in progress".into(),
        ));
    }

    state.set_pipeline_state(PipelineState::Loading);

    let outcome = run_ingestion(
        &state.config,
        Arc::clone(&state.embedder),
        params.force_refresh,
    )
    .await;

    match outcome {
        Ok(outcome) => {
            state.retriever.attach(Arc::clone(&outcome.store));
            state.set_pipeline_state(PipelineState::Ready);
            Ok(Json(outcome.report))
        }
        Err(e) => {
            state.set_pipeline_state(PipelineState::Uninitialized);
            tracing::error!("Ingestion failed: {e:#}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("ingestion failed: {e:#}"),
            ))
        }
    }
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        state: state.pipeline_state().label(),
    })
}
