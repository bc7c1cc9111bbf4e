//! Keyword and vector storage.
//!
//! Everything the query path needs from storage goes through [`VectorStore`]:
//! keyword to id, id to keyword and id to vector. Ingestion produces an
//! [`InMemoryVectorStore`]; at serving time an [`IndexedStore`] answers vector
//! lookups straight from the loaded forest.

pub mod in_memory;
pub mod indexed;
pub mod ingest;
pub mod vocabulary;

pub use in_memory::InMemoryVectorStore;
pub use indexed::IndexedStore;
pub use ingest::{read_text_embeddings, read_text_embeddings_file};
pub use vocabulary::Vocabulary;

use crate::core::types::ItemId;
use crate::Result;
use std::fmt::Debug;

/// Read-only lookups over a fixed set of keyword vectors with dense ids `0..len`.
pub trait VectorStore: Send + Sync + Debug {
    /// Length of every stored vector.
    fn dimension(&self) -> usize;

    /// Number of stored items.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vector stored for `id`, or `NotFound`.
    fn get_vector(&self, id: ItemId) -> Result<&[f32]>;

    /// Id of `keyword`, or `NotFound`.
    fn get_id(&self, keyword: &str) -> Result<ItemId>;

    /// Keyword of `id`, or `NotFound`.
    fn get_keyword(&self, id: ItemId) -> Result<&str>;
}
