use super::{VectorStore, Vocabulary};
use crate::core::common::WordVecError;
use crate::core::indexing::forest::AnnForest;
use crate::core::types::ItemId;
use crate::Result;
use std::sync::Arc;

/// Serving-time store: keywords from a [`Vocabulary`], vectors from the forest.
///
/// The forest holds the only copy of the vectors once it is loaded, so nothing
/// is duplicated between the index and the store.
#[derive(Debug, Clone)]
pub struct IndexedStore {
    vocabulary: Vocabulary,
    forest: Arc<AnnForest>,
}

impl IndexedStore {
    /// # Errors
    /// `InvalidInput` if the vocabulary and the forest disagree on item count.
    pub fn new(vocabulary: Vocabulary, forest: Arc<AnnForest>) -> Result<Self> {
        if vocabulary.len() != forest.len() {
            return Err(WordVecError::InvalidInput(format!(
                "vocabulary has {} keywords but the forest has {} items",
                vocabulary.len(),
                forest.len()
            )));
        }
        Ok(Self { vocabulary, forest })
    }
}

impl VectorStore for IndexedStore {
    fn dimension(&self) -> usize {
        self.forest.dimension()
    }

    fn len(&self) -> usize {
        self.vocabulary.len()
    }

    fn get_vector(&self, id: ItemId) -> Result<&[f32]> {
        Ok(self.forest.get_item(id)?)
    }

    fn get_id(&self, keyword: &str) -> Result<ItemId> {
        self.vocabulary.id_of(keyword).ok_or_else(|| WordVecError::keyword_not_found(keyword))
    }

    fn get_keyword(&self, id: ItemId) -> Result<&str> {
        self.vocabulary.keyword_of(id).ok_or_else(|| WordVecError::item_not_found(id))
    }
}
