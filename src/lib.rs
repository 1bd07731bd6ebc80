//! Retrieval-augmented question answering over a code-clone-detection corpus.
//!
//! The pipeline, write path to read path:
//!
//! ```text
//! corpus files ──► ingest (extract → clean → chunk)
//!                     │
//!                     ▼
//!              llm::embeddings ──► store::VectorStore (persisted JSON index)
//!                                        ▲
//! question ──► rag::AnswerEngine         │
//!                 │  gate / intent       │
//!                 ▼                      │
//!              retrieval::Retriever ─────┘
//!                 │
//!                 ▼
//!              llm::generate ──► AnswerResult {answer, sources, confidence}
//! ```
//!
//! Module overview:
//! - [`config`] — environment-driven configuration with sane defaults
//! - [`ingest`] — document loading, text extraction, cleaning, chunking
//! - [`store`] — persisted vector index with filtered similarity search
//! - [`retrieval`] — general / filtered / by-type retrieval strategies
//! - [`llm`] — embedding and generation providers (Ollama / OpenAI dialects)
//! - [`rag`] — out-of-domain gate, intent classification, answer synthesis
//! - [`eval`] — fixed-case evaluation harness with JSON and Markdown reports
//! - [`api`] — axum JSON endpoints over the pipeline

pub mod api;
pub mod config;
pub mod error;
pub mod eval;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod rag;
pub mod retrieval;
pub mod state;
pub mod store;
