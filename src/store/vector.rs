use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;
use crate::models::{Chunk, ScoredChunk};

/// One persisted (vector, chunk) pair. Write-once: entries are only ever
/// appended or dropped wholesale by a full rebuild.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct VectorEntry {
    chunk: Chunk,
    embedding: Vec<f32>,
}

/// On-disk index format. The dimension is recorded at creation time so a
/// provider change between ingestion and query time fails fast instead of
/// silently producing garbage similarity scores.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedIndex {
    embedding_dim: usize,
    entries: Vec<VectorEntry>,
}

/// In-memory vector index with JSON disk persistence, cosine similarity
/// search, and exact-match metadata filtering.
#[derive(Debug)]
pub struct VectorStore {
    index: RwLock<PersistedIndex>,
    persist_path: PathBuf,
}

impl VectorStore {
    /// True if a persisted index exists at this location.
    pub fn exists(vector_dir: &Path) -> bool {
        vector_dir.join("vectors.json").exists()
    }

    /// Open an existing persisted index. A missing or structurally corrupt
    /// index is reported as [`PipelineError::IndexUnavailable`] so callers
    /// can decide to rebuild rather than crash.
    pub fn load(vector_dir: &Path) -> Result<Self, PipelineError> {
        let persist_path = vector_dir.join("vectors.json");

        let data = std::fs::read_to_string(&persist_path).map_err(|e| {
            PipelineError::IndexUnavailable(format!("{}: {e}", persist_path.display()))
        })?;
        let index: PersistedIndex = serde_json::from_str(&data).map_err(|e| {
            PipelineError::IndexUnavailable(format!(
                "corrupt index {}: {e}",
                persist_path.display()
            ))
        })?;

        Ok(Self {
            index: RwLock::new(index),
            persist_path,
        })
    }

    /// Create a fresh, empty index for the given embedding dimension,
    /// replacing any index already present at this location.
    pub fn create(vector_dir: &Path, embedding_dim: usize) -> Result<Self> {
        std::fs::create_dir_all(vector_dir)
            .with_context(|| format!("Failed to create {}", vector_dir.display()))?;

        let store = Self {
            index: RwLock::new(PersistedIndex {
                embedding_dim,
                entries: Vec::new(),
            }),
            persist_path: vector_dir.join("vectors.json"),
        };
        store.persist()?;
        Ok(store)
    }

    /// Append a batch of chunks with their embeddings and persist.
    /// `embeddings` must be parallel with `chunks`.
    pub fn append_batch(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<()> {
        {
            let mut index = self.index.write();
            for (chunk, embedding) in chunks.iter().zip(embeddings) {
                if embedding.len() != index.embedding_dim {
                    anyhow::bail!(PipelineError::DimensionMismatch {
                        index_dim: index.embedding_dim,
                        query_dim: embedding.len(),
                    });
                }
                index.entries.push(VectorEntry {
                    chunk: chunk.clone(),
                    embedding: embedding.clone(),
                });
            }
        }
        self.persist()
    }

    /// Return the `k` entries nearest to `query_embedding` by cosine
    /// similarity, optionally restricted by exact-match metadata filters.
    /// Results are ordered by descending score; ties are unordered.
    pub fn search(
        &self,
        query_embedding: &[f32],
        k: usize,
        filters: Option<&HashMap<String, String>>,
    ) -> Result<Vec<ScoredChunk>> {
        let index = self.index.read();

        if query_embedding.len() != index.embedding_dim {
            anyhow::bail!(PipelineError::DimensionMismatch {
                index_dim: index.embedding_dim,
                query_dim: query_embedding.len(),
            });
        }

        let mut scored: Vec<(f32, &VectorEntry)> = index
            .entries
            .iter()
            .filter(|e| match filters {
                Some(f) => e.chunk.metadata.matches(f),
                None => true,
            })
            .map(|e| (cosine_similarity(query_embedding, &e.embedding), e))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(score, e)| ScoredChunk {
                chunk: e.chunk.clone(),
                score,
            })
            .collect())
    }

    pub fn entry_count(&self) -> usize {
        self.index.read().entries.len()
    }

    pub fn embedding_dim(&self) -> usize {
        self.index.read().embedding_dim
    }

    /// Atomic write via temp file + rename so a crash mid-write never
    /// leaves a truncated index behind.
    fn persist(&self) -> Result<()> {
        let index = self.index.read();
        let data = serde_json::to_string(&*index).context("Failed to serialize vector index")?;
        let tmp_path = self.persist_path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &data)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &self.persist_path)
            .with_context(|| format!("Failed to replace {}", self.persist_path.display()))?;
        Ok(())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}
