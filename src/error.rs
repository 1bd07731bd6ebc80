use std::path::PathBuf;
use thiserror::Error;

/// Failure taxonomy for the retrieval-augmented pipeline.
///
/// Which variants abort and which degrade:
/// - `SourceRead` and `MalformedRecord` are recovered locally during
///   ingestion (the file or record is skipped and logged).
/// - `IndexUnavailable` degrades retrieval to empty results; the ingestion
///   path treats it as "no existing index, perform a full build".
/// - `EmbeddingUnavailable` aborts the current ingestion batch. Batches
///   persisted before the failure remain on disk.
/// - `Generation` is surfaced to the caller as a failed answer and is never
///   retried beyond the provider's bounded retry policy.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read source file {path}: {reason}")]
    SourceRead { path: PathBuf, reason: String },

    #[error("embedding provider unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("vector index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("embedding dimension mismatch: index has {index_dim}, provider returned {query_dim}")]
    DimensionMismatch { index_dim: usize, query_dim: usize },

    #[error("generation provider failed: {0}")]
    Generation(String),

    #[error("malformed record in {source_file}: {reason}")]
    MalformedRecord { source_file: String, reason: String },
}
