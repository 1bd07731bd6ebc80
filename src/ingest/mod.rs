//! Corpus ingestion: walk the data directories, extract and clean text,
//! chunk it, embed it in batches, and persist the vector index.
//!
//! Ingestion is idempotent: when a persisted index already exists it is
//! reused unless a rebuild is forced. Individual unreadable files are
//! skipped and counted, never failing the whole run.

pub mod chunker;
pub mod clean;
pub mod extract;
pub mod qa_corpus;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;
use walkdir::WalkDir;

use crate::config::Config;
use crate::llm::EmbeddingProvider;
use crate::models::{Chunk, ChunkMetadata, Document, IngestReport};
use crate::store::VectorStore;

/// A built (or reused) index together with what happened while building it.
pub struct IngestOutcome {
    pub store: Arc<VectorStore>,
    pub report: IngestReport,
}

/// Build the vector index from the configured corpus, or reuse the
/// persisted one when present and `force_refresh` is false.
pub async fn run_ingestion(
    config: &Config,
    embedder: Arc<dyn EmbeddingProvider>,
    force_refresh: bool,
) -> Result<IngestOutcome> {
    let vector_dir = config.vector_dir();

    if !force_refresh && VectorStore::exists(&vector_dir) {
        let store = Arc::new(VectorStore::load(&vector_dir)?);
        tracing::info!(
            entries = store.entry_count(),
            "Reusing persisted vector index"
        );
        return Ok(IngestOutcome {
            report: IngestReport {
                chunks_indexed: store.entry_count(),
                reused_existing: true,
                ..Default::default()
            },
            store,
        });
    }

    let (mut documents, files_skipped) = load_documents(config);
    let qa = qa_corpus::load_qa_corpus(&config.qa_corpus_path())?;
    let qa_pairs_loaded = qa.documents.len();
    documents.extend(qa.documents);

    tracing::info!(
        documents = documents.len(),
        skipped = files_skipped,
        qa_pairs = qa_pairs_loaded,
        "Corpus loaded, chunking and embedding"
    );

    let chunks: Vec<Chunk> = documents.iter().flat_map(chunk_document(config)).collect();

    let store = Arc::new(VectorStore::create(
        &vector_dir,
        embedder.embedding_dim(),
    )?);

    for batch in chunks.chunks(config.batch_size.max(1)) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder
            .embed_batch(&texts)
            .await
            .context("Embedding batch failed during ingestion")?;
        store.append_batch(batch, &embeddings)?;
    }

    tracing::info!(chunks = chunks.len(), "Vector index built");

    Ok(IngestOutcome {
        report: IngestReport {
            documents_loaded: documents.len(),
            files_skipped,
            chunks_indexed: chunks.len(),
            qa_pairs_loaded,
            qa_validation_errors: qa.validation_errors,
            reused_existing: false,
        },
        store,
    })
}

fn chunk_document(config: &Config) -> impl Fn(&Document) -> Vec<Chunk> + '_ {
    move |doc| {
        chunker::split_text(&doc.cleaned_content, config.chunk_size, config.chunk_overlap)
            .into_iter()
            .map(|span| {
                let file_name = Path::new(&doc.source_path)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| doc.source_path.clone());
                Chunk {
                    id: Uuid::new_v4(),
                    parent_document_id: doc.id,
                    length: span.text.len(),
                    start_offset: span.start,
                    text: span.text,
                    metadata: ChunkMetadata {
                        source: doc.source_path.clone(),
                        file_type: doc.file_type.clone(),
                        file_name,
                        directory: doc.directory_category.clone(),
                        content_type: doc.content_type.clone(),
                    },
                }
            })
            .collect()
    }
}

/// Walk every configured category directory and load all supported files.
/// Returns the documents plus the count of files skipped (unsupported
/// extension, extraction failure, or empty after cleaning).
pub fn load_documents(config: &Config) -> (Vec<Document>, usize) {
    let mut documents = Vec::new();
    let mut skipped = 0usize;

    for category in &config.data_categories {
        let dir = config.data_dir.join(&category.path);
        if !dir.is_dir() {
            tracing::debug!("Category directory {} missing, skipping", dir.display());
            continue;
        }

        for entry in WalkDir::new(&dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            match load_file(entry.path(), &category.name) {
                Ok(Some(doc)) => documents.push(doc),
                Ok(None) => skipped += 1,
                Err(e) => {
                    tracing::warn!("Skipping {}: {e:#}", entry.path().display());
                    skipped += 1;
                }
            }
        }
    }

    (documents, skipped)
}

/// Load one file. `Ok(None)` means the file is not indexable (unsupported
/// extension or no usable text); errors mean extraction itself failed.
fn load_file(path: &Path, category: &str) -> Result<Option<Document>> {
    let extension = match path.extension() {
        Some(ext) => format!(".{}", ext.to_string_lossy().to_lowercase()),
        None => return Ok(None),
    };
    let Some(extractor) = extract::extractor_for(&extension) else {
        return Ok(None);
    };

    let raw = extractor
        .extract(path)
        .map_err(|e| crate::error::PipelineError::SourceRead {
            path: path.to_path_buf(),
            reason: format!("{e:#}"),
        })?;
    let cleaned = clean::clean_text(&raw);
    if cleaned.is_empty() {
        return Ok(None);
    }

    Ok(Some(Document {
        id: Uuid::new_v4(),
        raw_content: raw,
        cleaned_content: cleaned,
        source_path: path.display().to_string(),
        file_type: extension,
        directory_category: category.to_string(),
        content_type: "document".to_string(),
    }))
}
