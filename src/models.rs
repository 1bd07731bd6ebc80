use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A normalized source document. Immutable once created; one per source file
/// (or one per question/answer pair treated as a pseudo-document).
#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub raw_content: String,
    pub cleaned_content: String,
    pub source_path: String,
    pub file_type: String,
    /// Corpus category the document was loaded from ("papers", "tools_docs", ...)
    pub directory_category: String,
    /// "document" for files, "qa_pair" for synthetic QA pseudo-documents
    pub content_type: String,
}

/// A bounded, overlapping window of a document's cleaned text. The unit that
/// is embedded, indexed, and retrieved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: Uuid,
    pub parent_document_id: Uuid,
    pub text: String,
    /// Byte offset of `text` within the parent's cleaned content
    pub start_offset: usize,
    pub length: usize,
    pub metadata: ChunkMetadata,
}

/// Provenance carried with every chunk into the vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source: String,
    pub file_type: String,
    pub file_name: String,
    pub directory: String,
    pub content_type: String,
}

impl ChunkMetadata {
    /// True if every filter key matches this metadata exactly.
    /// Unknown filter keys never match.
    pub fn matches(&self, filters: &HashMap<String, String>) -> bool {
        filters.iter().all(|(key, value)| match key.as_str() {
            "source" => &self.source == value,
            "file_type" => &self.file_type == value,
            "file_name" => &self.file_name == value,
            "directory" => &self.directory == value,
            "content_type" => &self.content_type == value,
            _ => false,
        })
    }
}

/// A retrieved chunk with its similarity score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Retrieval strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    General,
    Filtered,
    ByType,
}

/// Rule-derived answer confidence. Not a calibrated probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// The synthesizer's output for one user message.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerResult {
    pub answer: String,
    /// Provenance identifiers of the chunks the answer was conditioned on
    pub sources: Vec<String>,
    pub confidence: Confidence,
    /// Number of chunks concatenated into the prompt context
    pub context_used: usize,
}

/// Chat request body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Search request body for the raw retrieval endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_search_type")]
    pub search_type: SearchType,
    #[serde(default)]
    pub filters: Option<HashMap<String, String>>,
}

fn default_search_type() -> SearchType {
    SearchType::General
}

/// One synthetic question/answer record from the QA corpus file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub source: String,
    #[serde(default, rename = "type")]
    pub pair_type: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub venue: Option<String>,
}

/// Summary returned by an ingestion run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub documents_loaded: usize,
    pub files_skipped: usize,
    pub chunks_indexed: usize,
    pub qa_pairs_loaded: usize,
    pub qa_validation_errors: usize,
    /// True when an existing index was reused without re-embedding
    pub reused_existing: bool,
}
