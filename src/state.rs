//! Shared application state wiring the pipeline components together.

use anyhow::Result;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::config::Config;
use crate::llm::{EmbeddingProvider, HttpLlmClient};
use crate::rag::AnswerEngine;
use crate::retrieval::Retriever;

/// Pipeline lifecycle. `Ready` means a vector index is attached and
/// queryable; `Loading` means an ingestion run is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Uninitialized,
    Loading,
    Ready,
}

impl PipelineState {
    pub fn label(self) -> &'static str {
        match self {
            PipelineState::Uninitialized => "uninitialized",
            PipelineState::Loading => "loading",
            PipelineState::Ready => "ready",
        }
    }
}

pub struct AppState {
    pub config: Config,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub retriever: Arc<Retriever>,
    pub engine: Arc<AnswerEngine>,
    /// Generation is the long pole; one request at a time keeps a small
    /// local model responsive.
    pub chat_permits: Semaphore,
    pipeline_state: RwLock<PipelineState>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Arc<Self>> {
        let client = Arc::new(HttpLlmClient::new(config.llm.clone())?);
        let embedder: Arc<dyn EmbeddingProvider> = client.clone();
        let retriever = Arc::new(Retriever::new(
            Arc::clone(&embedder),
            config.vector_dir(),
            config.top_k,
        ));
        let engine = Arc::new(AnswerEngine::new(Arc::clone(&retriever), client));

        Ok(Arc::new(Self {
            config,
            embedder,
            retriever,
            engine,
            chat_permits: Semaphore::new(1),
            pipeline_state: RwLock::new(PipelineState::Uninitialized),
        }))
    }

    pub fn pipeline_state(&self) -> PipelineState {
        *self.pipeline_state.read()
    }

    pub fn set_pipeline_state(&self, state: PipelineState) {
        *self.pipeline_state.write() = state;
    }
}
