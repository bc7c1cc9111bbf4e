// src/core/vector/mod.rs

//! Vector math shared by the forest and the query engine.

pub mod similarity;

pub use similarity::{add_assign, cosine_similarity, dot, norm, normalized};
