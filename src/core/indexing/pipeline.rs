//! Offline build: store contents in, built forest out.

use crate::core::indexing::forest::{default_leaf_capacity, AnnForest};
use crate::core::store::VectorStore;
use crate::core::types::ItemId;
use crate::Result;
use std::time::Instant;
use tracing::info;

const PROGRESS_EVERY: usize = 100_000;

/// Forest construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildParams {
    pub num_trees: usize,
    /// `None` selects `max(1, dimension / 2)`.
    pub leaf_capacity: Option<usize>,
    pub seed: u64,
}

/// Adds every item of `store`, in id order, to a fresh forest and builds it.
///
/// # Errors
/// Propagates store lookups and forest parameter errors.
pub fn build_forest(store: &dyn VectorStore, params: BuildParams) -> Result<AnnForest> {
    let dimension = store.dimension();
    let leaf_capacity = params.leaf_capacity.unwrap_or_else(|| default_leaf_capacity(dimension));
    let mut forest = AnnForest::with_leaf_capacity(dimension, leaf_capacity)?;

    let started = Instant::now();
    let count = store.len();
    for index in 0..count {
        let id = index as ItemId;
        forest.add_item(id, store.get_vector(id)?)?;
        if (index + 1) % PROGRESS_EVERY == 0 {
            info!(added = index + 1, total = count, "adding items to forest");
        }
    }
    info!(items = count, elapsed_ms = started.elapsed().as_millis(), "items added");

    forest.build(params.num_trees, params.seed)?;
    Ok(forest)
}
