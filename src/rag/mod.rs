//! Answer synthesis: gate, classify, retrieve, assemble, generate, grade.
//!
//! Per request the flow is strictly sequential. The out-of-domain gate and
//! the empty-retrieval path return fixed answers without ever calling the
//! generation provider.

pub mod intent;
pub mod prompts;

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::Arc;

use crate::llm::GenerationProvider;
use crate::models::{AnswerResult, Confidence, SearchType};
use crate::rag::intent::Intent;
use crate::retrieval::Retriever;

/// Fixed refusal for out-of-domain questions.
pub const REFUSAL_ANSWER: &str = "抱歉，这个问题超出了代码克隆检测的专业领域范围。我专注于回答与代码克隆检测相关的问题，包括：\n\n\
- 代码克隆的概念和类型\n\
- 克隆检测工具和方法\n\
- 代码相似度分析\n\
- 检测算法原理\n\n\
请提问与代码克隆检测相关的问题。";

/// Fixed answer when retrieval yields nothing.
pub const NOT_FOUND_ANSWER: &str =
    "抱歉，我没有找到相关的文档来回答您的问题。不过我可以基于一般知识为您解答。";

/// Code-analysis retrieval queries are built from a bounded prefix of the
/// user input.
const CODE_QUERY_PREFIX_CHARS: usize = 200;

pub struct AnswerEngine {
    retriever: Arc<Retriever>,
    generator: Arc<dyn GenerationProvider>,
}

impl AnswerEngine {
    pub fn new(retriever: Arc<Retriever>, generator: Arc<dyn GenerationProvider>) -> Self {
        Self {
            retriever,
            generator,
        }
    }

    /// Answer a chat message. Errors are generation-provider failures only;
    /// gate refusals and empty retrieval are ordinary answers.
    pub async fn respond(&self, message: &str) -> Result<AnswerResult> {
        if intent::is_out_of_domain(message) {
            tracing::info!("Refusing out-of-domain question");
            return Ok(AnswerResult {
                answer: REFUSAL_ANSWER.to_string(),
                sources: Vec::new(),
                confidence: Confidence::Low,
                context_used: 0,
            });
        }

        let intent = intent::classify(message);
        tracing::debug!(?intent, "Classified question");

        let chunks = self.retrieve(&intent, message).await?;
        if chunks.is_empty() {
            return Ok(AnswerResult {
                answer: NOT_FOUND_ANSWER.to_string(),
                sources: Vec::new(),
                confidence: Confidence::Low,
                context_used: 0,
            });
        }

        let context = chunks
            .iter()
            .map(|c| c.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        // The concept template explains the extracted concept itself, not the
        // question that asked for it.
        let prompt_subject = match &intent {
            Intent::Definition { concept } => concept.as_str(),
            _ => message,
        };
        let prompt = prompts::render(&intent, &context, prompt_subject);

        let answer = self
            .generator
            .generate(prompts::SYSTEM_PROMPT, &prompt)
            .await
            .context("Answer generation failed")?;

        let sources: Vec<String> = chunks
            .iter()
            .map(|c| c.chunk.metadata.source.clone())
            .collect();

        let threshold = match intent {
            Intent::Comparison => 2,
            _ => 3,
        };
        let confidence = if chunks.len() >= threshold {
            Confidence::High
        } else {
            Confidence::Medium
        };

        Ok(AnswerResult {
            answer: answer.trim().to_string(),
            sources,
            confidence,
            context_used: chunks.len(),
        })
    }

    /// Run the retrieval shape selected by the intent.
    async fn retrieve(
        &self,
        intent: &Intent,
        message: &str,
    ) -> Result<Vec<crate::models::ScoredChunk>> {
        match intent {
            Intent::Comparison => {
                let filters =
                    HashMap::from([("doc_type".to_string(), "tools".to_string())]);
                self.retriever
                    .search(message, SearchType::ByType, Some(&filters))
                    .await
            }
            Intent::Definition { concept } => {
                let query = format!("解释概念：{concept}");
                let chunks = self
                    .retriever
                    .search(&query, SearchType::General, None)
                    .await?;
                if !chunks.is_empty() {
                    return Ok(chunks);
                }
                // Widen to the bare concept when the phrased query misses
                self.retriever
                    .search(concept, SearchType::General, None)
                    .await
            }
            Intent::CodeAnalysis => {
                let prefix: String = message.chars().take(CODE_QUERY_PREFIX_CHARS).collect();
                let query = format!("代码片段分析：{prefix}");
                self.retriever.search(&query, SearchType::General, None).await
            }
            Intent::General => {
                self.retriever
                    .search(message, SearchType::General, None)
                    .await
            }
        }
    }
}
