// src/api/types.rs
//! Request and response bodies.

use crate::core::types::ScoredKeyword;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarKeywordsResponse {
    pub keywords: Vec<ScoredKeyword>,
}

/// Body of `POST get.similar.keywords.from.vector`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorQueryRequest {
    /// Zero, negative or absent selects the default count.
    #[serde(default)]
    pub num_keywords: Option<i64>,
    pub vector: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordVectorResponse {
    pub vector: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScoreResponse {
    pub score: f32,
}
