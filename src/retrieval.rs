//! Query-time retrieval over the persisted vector index.
//!
//! The retriever embeds the query, searches the index by cosine similarity,
//! and applies the search mode: unfiltered, exact metadata filters, or a
//! document-type shortcut that maps friendly type names onto corpus
//! directories.

use anyhow::Result;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::llm::EmbeddingProvider;
use crate::models::{ScoredChunk, SearchType};
use crate::store::VectorStore;

/// Map a friendly document-type name onto the corpus directory it lives in.
/// Unknown names get no filter, falling back to an unfiltered search.
fn type_filter(doc_type: &str) -> Option<HashMap<String, String>> {
    let directory = match doc_type {
        "papers" => "papers",
        "tools" => "tools_docs",
        "project" => "project_docs",
        "examples" => "examples",
        _ => return None,
    };
    Some(HashMap::from([(
        "directory".to_string(),
        directory.to_string(),
    )]))
}

pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    vector_dir: PathBuf,
    top_k: usize,
    store: RwLock<Option<Arc<VectorStore>>>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, vector_dir: PathBuf, top_k: usize) -> Self {
        Self {
            embedder,
            vector_dir,
            top_k,
            store: RwLock::new(None),
        }
    }

    /// Attach a freshly built index, replacing any previously loaded one.
    pub fn attach(&self, store: Arc<VectorStore>) {
        *self.store.write() = Some(store);
    }

    /// Search the index for chunks relevant to `query`. Returns an empty
    /// result set when no index has been built yet.
    pub async fn search(
        &self,
        query: &str,
        search_type: SearchType,
        filters: Option<&HashMap<String, String>>,
    ) -> Result<Vec<ScoredChunk>> {
        let Some(store) = self.load_store() else {
            tracing::warn!("Search requested before any index was built");
            return Ok(Vec::new());
        };

        let effective_filters = match search_type {
            SearchType::General => None,
            SearchType::Filtered => filters.cloned(),
            SearchType::ByType => {
                let resolved = filters
                    .and_then(|f| f.get("doc_type"))
                    .and_then(|t| type_filter(t));
                if resolved.is_none() {
                    tracing::warn!("Unknown or missing doc_type, searching unfiltered");
                }
                resolved
            }
        };

        let query_embedding = self.embedder.embed_single(query).await?;
        store.search(&query_embedding, self.top_k, effective_filters.as_ref())
    }

    /// Lazy-load the persisted index on first use so the server can start
    /// before ingestion has run.
    fn load_store(&self) -> Option<Arc<VectorStore>> {
        if let Some(store) = self.store.read().as_ref() {
            return Some(Arc::clone(store));
        }

        let mut slot = self.store.write();
        if let Some(store) = slot.as_ref() {
            return Some(Arc::clone(store));
        }
        match VectorStore::load(&self.vector_dir) {
            Ok(store) => {
                let store = Arc::new(store);
                *slot = Some(Arc::clone(&store));
                Some(store)
            }
            Err(e) => {
                tracing::debug!("No usable index on disk: {e}");
                None
            }
        }
    }
}
