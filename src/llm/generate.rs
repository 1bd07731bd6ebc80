//! Non-streaming chat completion with bounded retries.
//!
//! Transient failures (connection errors, timeouts, 5xx) are retried with a
//! short exponential backoff; client errors (4xx) are not, since repeating a
//! bad request cannot succeed.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::PipelineError;
use crate::llm::{GenerationProvider, HttpLlmClient};

const INITIAL_BACKOFF_MS: u64 = 500;

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

// ─── Ollama dialect ──────────────────────────────────────

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    num_predict: u32,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: String,
}

// ─── OpenAI dialect ──────────────────────────────────────

#[derive(Serialize)]
struct OpenAiChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: String,
}

enum CallError {
    /// Worth retrying: connection failure, timeout, or server-side error.
    Transient(String),
    /// Not worth retrying: the request itself is rejected.
    Permanent(String),
}

#[async_trait]
impl GenerationProvider for HttpLlmClient {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let mut backoff = Duration::from_millis(INITIAL_BACKOFF_MS);
        let mut last_error = String::new();

        for attempt in 0..=self.config.max_retries {
            let result = if self.is_openai() {
                self.chat_openai(system_prompt, user_prompt).await
            } else {
                self.chat_ollama(system_prompt, user_prompt).await
            };

            match result {
                Ok(answer) => return Ok(answer),
                Err(CallError::Permanent(reason)) => {
                    anyhow::bail!(PipelineError::Generation(reason));
                }
                Err(CallError::Transient(reason)) => {
                    tracing::warn!(
                        attempt,
                        "Generation attempt failed, {}: {reason}",
                        if attempt < self.config.max_retries {
                            "retrying"
                        } else {
                            "giving up"
                        }
                    );
                    last_error = reason;
                    if attempt < self.config.max_retries {
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                }
            }
        }

        anyhow::bail!(PipelineError::Generation(last_error))
    }
}

impl HttpLlmClient {
    async fn chat_ollama(&self, system: &str, user: &str) -> Result<String, CallError> {
        let url = format!("{}/api/chat", self.config.base_url);
        let request = OllamaChatRequest {
            model: &self.config.chat_model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            stream: false,
            options: OllamaOptions {
                num_predict: self.config.max_tokens as u32,
            },
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| CallError::Transient(format!("Ollama chat request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status, "Ollama"));
        }

        let body: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| CallError::Transient(format!("Ollama chat response unreadable: {e}")))?;
        Ok(body.message.content)
    }

    async fn chat_openai(&self, system: &str, user: &str) -> Result<String, CallError> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);
        let request = OpenAiChatRequest {
            model: &self.config.chat_model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: self.config.max_tokens as u32,
        };

        let mut req = self.http.post(&url).json(&request);
        if let Some(key) = &self.config.api_key {
            req = req.bearer_auth(key);
        }

        let response = req
            .send()
            .await
            .map_err(|e| CallError::Transient(format!("OpenAI chat request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status, "OpenAI"));
        }

        let body: OpenAiChatResponse = response
            .json()
            .await
            .map_err(|e| CallError::Transient(format!("OpenAI chat response unreadable: {e}")))?;
        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| CallError::Permanent("OpenAI chat returned no choices".to_string()))
    }
}

fn classify_status(status: reqwest::StatusCode, provider: &str) -> CallError {
    let reason = format!("{provider} chat returned {status}");
    if status.is_server_error() {
        CallError::Transient(reason)
    } else {
        CallError::Permanent(reason)
    }
}
