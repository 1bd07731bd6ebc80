//! Loading and validation of the synthetic question/answer corpus.
//!
//! QA pairs are generated offline from paper metadata and ingested as
//! pseudo-documents alongside the file corpus. Records that fail basic shape
//! validation are skipped and counted, never aborting the batch.

use anyhow::{Context, Result};
use std::path::Path;
use uuid::Uuid;

use crate::models::{Document, QaPair};

/// Minimum question length in characters for a record to be usable.
const MIN_QUESTION_CHARS: usize = 10;
/// Minimum answer length in characters for a record to be usable.
const MIN_ANSWER_CHARS: usize = 20;

/// Result of loading a QA corpus file: the usable pseudo-documents plus the
/// count of records rejected by validation.
#[derive(Debug, Default)]
pub struct QaCorpus {
    pub documents: Vec<Document>,
    pub validation_errors: usize,
}

/// Load QA pairs from a JSON array file. A missing file is an empty corpus,
/// not an error; a structurally unreadable file is.
pub fn load_qa_corpus(path: &Path) -> Result<QaCorpus> {
    if !path.exists() {
        return Ok(QaCorpus::default());
    }

    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read QA corpus {}", path.display()))?;
    let pairs: Vec<QaPair> = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse QA corpus {}", path.display()))?;

    let mut corpus = QaCorpus::default();
    for (idx, pair) in pairs.into_iter().enumerate() {
        match validate_pair(&pair) {
            Ok(()) => corpus.documents.push(pair_to_document(&pair, path)),
            Err(reason) => {
                let err = crate::error::PipelineError::MalformedRecord {
                    source_file: path.display().to_string(),
                    reason,
                };
                tracing::warn!("Skipping QA record {idx}: {err}");
                corpus.validation_errors += 1;
            }
        }
    }

    Ok(corpus)
}

fn validate_pair(pair: &QaPair) -> Result<(), String> {
    if pair.question.chars().count() < MIN_QUESTION_CHARS {
        return Err(format!(
            "question shorter than {MIN_QUESTION_CHARS} characters"
        ));
    }
    if pair.answer.chars().count() < MIN_ANSWER_CHARS {
        return Err(format!("answer shorter than {MIN_ANSWER_CHARS} characters"));
    }
    Ok(())
}

/// Render a QA pair as a pseudo-document so it flows through the same
/// chunking and embedding path as file documents.
fn pair_to_document(pair: &QaPair, corpus_path: &Path) -> Document {
    let content = format!("问题：{}\n答案：{}", pair.question, pair.answer);
    let source = if pair.source.is_empty() {
        corpus_path.display().to_string()
    } else {
        pair.source.clone()
    };

    Document {
        id: Uuid::new_v4(),
        raw_content: content.clone(),
        cleaned_content: content,
        source_path: source,
        file_type: ".json".to_string(),
        directory_category: "qa_pairs".to_string(),
        content_type: "qa_pair".to_string(),
    }
}
