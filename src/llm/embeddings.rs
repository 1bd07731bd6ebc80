//! Embedding requests against Ollama's `/api/embed` or an OpenAI-compatible
//! `/v1/embeddings` endpoint.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::llm::{EmbeddingProvider, HttpLlmClient};

/// Embedding models have context limits; inputs beyond this many characters
/// are truncated rather than rejected.
const MAX_EMBED_CHARS: usize = 3000;

/// Truncate on a character boundary so multi-byte text never splits mid-char.
fn truncate_for_embedding(text: &str) -> &str {
    match text.char_indices().nth(MAX_EMBED_CHARS) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

// ─── Ollama dialect ──────────────────────────────────────

#[derive(Serialize)]
struct OllamaEmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

// ─── OpenAI dialect ──────────────────────────────────────

#[derive(Serialize)]
struct OpenAiEmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct OpenAiEmbedResponse {
    data: Vec<OpenAiEmbedding>,
}

#[derive(Deserialize)]
struct OpenAiEmbedding {
    index: usize,
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for HttpLlmClient {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let inputs: Vec<&str> = texts.iter().map(|t| truncate_for_embedding(t)).collect();

        let vectors = if self.is_openai() {
            self.embed_openai(&inputs).await
        } else {
            self.embed_ollama(&inputs).await
        }
        .map_err(|e| PipelineError::EmbeddingUnavailable(format!("{e:#}")))?;

        if vectors.len() != texts.len() {
            anyhow::bail!(PipelineError::EmbeddingUnavailable(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                vectors.len()
            )));
        }
        Ok(vectors)
    }

    fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }
}

impl HttpLlmClient {
    async fn embed_ollama(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/api/embed", self.config.base_url);
        let request = OllamaEmbedRequest {
            model: &self.config.embedding_model,
            input: inputs.to_vec(),
        };

        let response = self.http.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("Ollama embed returned {}", response.status());
        }

        let body: OllamaEmbedResponse = response.json().await?;
        Ok(body.embeddings)
    }

    async fn embed_openai(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/v1/embeddings", self.config.base_url);
        let request = OpenAiEmbedRequest {
            model: &self.config.embedding_model,
            input: inputs.to_vec(),
        };

        let mut req = self.http.post(&url).json(&request);
        if let Some(key) = &self.config.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        if !response.status().is_success() {
            anyhow::bail!("OpenAI embed returned {}", response.status());
        }

        let mut body: OpenAiEmbedResponse = response.json().await?;
        body.data.sort_by_key(|d| d.index);
        Ok(body.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let text = "克".repeat(MAX_EMBED_CHARS + 50);
        let truncated = truncate_for_embedding(&text);
        assert_eq!(truncated.chars().count(), MAX_EMBED_CHARS);
    }

    #[test]
    fn test_short_text_passes_through() {
        let text = "clone detection overview";
        assert_eq!(truncate_for_embedding(text), text);
    }
}
