//! Vector index persistence and similarity search.

mod vector;

pub use vector::VectorStore;
