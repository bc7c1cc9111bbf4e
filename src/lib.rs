#![forbid(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::panic)]
#![warn(clippy::cast_possible_wrap)]
#![warn(clippy::all)]

//! # wordvec: keyword similarity over word embeddings
//!
//! `wordvec` answers "which keywords are closest to these?" over a fixed set of
//! word vectors. It features:
//! - A forest of random-projection trees for approximate nearest-neighbor search
//! - Exact cosine re-ranking of the candidates the forest returns
//! - Multi-keyword queries answered against the sum of their vectors
//! - Dictionary segmentation of unknown phrases
//! - An offline ingest and build pipeline plus an HTTP query service

pub mod api;
pub mod core;

// Re-export key types for easier use by library consumers
pub use crate::core::common::WordVecError;
pub use crate::core::config::Config;
pub use crate::core::indexing::{AnnForest, SearchBudget};
pub use crate::core::query::{QueryEngine, QueryOptions};
pub use crate::core::types::{ItemId, ScoredKeyword};

/// Core result type for the library
pub type Result<T> = std::result::Result<T, WordVecError>;
