// src/core/types/mod.rs

use serde::{Deserialize, Serialize};

/// Dense item identifier, `0..N-1` for a store or forest holding `N` items.
pub type ItemId = u32;

/// One ranked result: a keyword and its cosine similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredKeyword {
    pub word: String,
    pub similarity: f32,
}

impl ScoredKeyword {
    #[must_use]
    pub fn new(word: impl Into<String>, similarity: f32) -> Self {
        Self { word: word.into(), similarity }
    }
}
