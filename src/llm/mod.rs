//! LLM provider integration.
//!
//! Two narrow async traits decouple the pipeline from the concrete provider:
//! [`EmbeddingProvider`] for turning text into vectors and
//! [`GenerationProvider`] for chat-style completion. [`HttpLlmClient`] is the
//! production implementation, speaking either the Ollama or the
//! OpenAI-compatible HTTP dialect depending on configuration.

pub mod embeddings;
pub mod generate;

use async_trait::async_trait;
use anyhow::Result;
use std::time::Duration;

use crate::config::LlmConfig;

/// Turns text into embedding vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts, preserving order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text.
    async fn embed_single(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| anyhow::anyhow!("Provider returned no embedding"))
    }

    /// Dimension of the vectors this provider produces.
    fn embedding_dim(&self) -> usize;
}

/// Produces a completion for a system/user prompt pair.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

/// HTTP client for Ollama and OpenAI-compatible endpoints. Cheap to clone;
/// the underlying connection pool is shared.
#[derive(Clone)]
pub struct HttpLlmClient {
    pub(crate) http: reqwest::Client,
    pub(crate) config: LlmConfig,
}

impl HttpLlmClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.generation_timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    pub(crate) fn is_openai(&self) -> bool {
        self.config.provider == "openai"
    }
}
