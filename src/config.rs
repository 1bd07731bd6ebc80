use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A logical corpus category and the directory it is loaded from.
///
/// The corpus is organized as one directory tree per category: research
/// papers, clone-detection tool docs, project docs, and example clone pairs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataCategory {
    /// Category name used in metadata filters (e.g. "papers")
    pub name: String,
    /// Directory containing the category's source files, relative to `data_dir`
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where the persisted vector index and corpus files live
    pub data_dir: PathBuf,
    /// Server bind address
    pub bind_addr: String,
    /// Corpus categories ingested from disk
    pub data_categories: Vec<DataCategory>,
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between adjacent chunks in characters
    pub chunk_overlap: usize,
    /// Number of chunks retrieved per query
    pub top_k: usize,
    /// Number of chunks embedded per ingestion batch
    pub batch_size: usize,
    /// LLM provider configuration
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "ollama" or "openai"
    pub provider: String,
    /// Base URL for the LLM API
    pub base_url: String,
    /// Model name for answer generation
    pub chat_model: String,
    /// Model name for embeddings
    pub embedding_model: String,
    /// API key (only needed for cloud providers)
    pub api_key: Option<String>,
    /// Embedding vector dimension
    pub embedding_dim: usize,
    /// Maximum new tokens requested per generation
    pub max_tokens: usize,
    /// Per-request timeout for generation calls, in seconds
    pub generation_timeout_secs: u64,
    /// Retries for transient provider failures (connect errors, 5xx)
    pub max_retries: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_categories: default_categories(),
            data_dir: PathBuf::from("./data"),
            bind_addr: "127.0.0.1:9000".to_string(),
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 5,
            batch_size: 100,
            llm: LlmConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            base_url: "http://localhost:11434".to_string(),
            chat_model: "qwen2.5-coder:1.5b".to_string(),
            embedding_model: "bge-small-zh-v1.5".to_string(),
            api_key: None,
            embedding_dim: 512,
            max_tokens: 512,
            generation_timeout_secs: 120,
            max_retries: 2,
        }
    }
}

fn default_categories() -> Vec<DataCategory> {
    ["papers", "tools_docs", "project_docs", "examples"]
        .iter()
        .map(|name| DataCategory {
            name: (*name).to_string(),
            path: PathBuf::from(name),
        })
        .collect()
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("CLONE_RAG_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(addr) = std::env::var("CLONE_RAG_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(val) = std::env::var("CHUNK_SIZE") {
            if let Ok(v) = val.parse() {
                config.chunk_size = v;
            }
        }
        if let Ok(val) = std::env::var("CHUNK_OVERLAP") {
            if let Ok(v) = val.parse() {
                config.chunk_overlap = v;
            }
        }
        if let Ok(val) = std::env::var("TOP_K_RETRIEVAL") {
            if let Ok(v) = val.parse() {
                config.top_k = v;
            }
        }
        if let Ok(val) = std::env::var("INGEST_BATCH_SIZE") {
            if let Ok(v) = val.parse() {
                config.batch_size = v;
            }
        }
        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            config.llm.provider = provider;
        }
        if let Ok(url) = std::env::var("LLM_BASE_URL") {
            config.llm.base_url = url;
        }
        if let Ok(model) = std::env::var("LLM_CHAT_MODEL") {
            config.llm.chat_model = model;
        }
        if let Ok(model) = std::env::var("LLM_EMBEDDING_MODEL") {
            config.llm.embedding_model = model;
        }
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            config.llm.api_key = Some(key);
        }
        if let Ok(dim) = std::env::var("LLM_EMBEDDING_DIM") {
            if let Ok(d) = dim.parse() {
                config.llm.embedding_dim = d;
            }
        }
        if let Ok(val) = std::env::var("LLM_MAX_TOKENS") {
            if let Ok(v) = val.parse() {
                config.llm.max_tokens = v;
            }
        }
        if let Ok(val) = std::env::var("LLM_GENERATION_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.llm.generation_timeout_secs = v;
            }
        }
        if let Ok(val) = std::env::var("LLM_MAX_RETRIES") {
            if let Ok(v) = val.parse() {
                config.llm.max_retries = v;
            }
        }

        config
    }

    /// Apply a model-size preset ("1.5b" or "7b") for local Qwen coder models.
    pub fn with_model_size(mut self, size: &str) -> Self {
        match size.to_lowercase().as_str() {
            "7b" => {
                self.llm.chat_model = "qwen2.5-coder:7b".to_string();
                self.llm.max_tokens = 768;
            }
            _ => {
                self.llm.chat_model = "qwen2.5-coder:1.5b".to_string();
                self.llm.max_tokens = 512;
            }
        }
        self
    }

    pub fn vector_dir(&self) -> PathBuf {
        self.data_dir.join("vectors")
    }

    pub fn qa_corpus_path(&self) -> PathBuf {
        self.data_dir.join("qa_pairs.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_categories_cover_corpus_layout() {
        let config = Config::default();
        let names: Vec<&str> = config
            .data_categories
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["papers", "tools_docs", "project_docs", "examples"]
        );
        // Paths are relative; they are resolved against data_dir exactly once
        // by the document loader.
        for category in &config.data_categories {
            assert!(category.path.is_relative());
            assert_eq!(category.path, PathBuf::from(&category.name));
        }
    }

    #[test]
    fn test_default_chunking_parameters() {
        let config = Config::default();
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.top_k, 5);
        assert_eq!(config.batch_size, 100);
    }

    #[test]
    fn test_model_size_preset() {
        let config = Config::default().with_model_size("7B");
        assert_eq!(config.llm.chat_model, "qwen2.5-coder:7b");
        assert_eq!(config.llm.max_tokens, 768);

        let config = Config::default().with_model_size("1.5b");
        assert_eq!(config.llm.max_tokens, 512);
    }
}
