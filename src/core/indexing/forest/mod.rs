// src/core/indexing/forest/mod.rs

//! Forest of random-projection trees for approximate nearest-neighbor search
//! under the angular (cosine) metric.

pub use self::error::ForestError;
pub use self::search::SearchBudget;
pub use self::tree::{Hyperplane, NodeId, ProjectionTree, TreeNode};

use self::tree::VectorTable;
use crate::core::types::ItemId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

mod builder;
mod error;
mod persistence;
mod search;
mod tree;


/// `AnnForest`: the item vectors plus an ensemble of independently built trees.
///
/// Lifecycle: items are added, then `build` runs exactly once; afterwards the
/// forest is read-only. A forest produced by `load` is already built. All read
/// methods take `&self` and the type is `Sync`, so one instance can serve any
/// number of concurrent queries.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnForest {
    dimension: usize,
    leaf_capacity: usize,
    /// Flat `id * dimension` table; the single copy every tree refers to.
    vectors: Vec<f32>,
    trees: Vec<ProjectionTree>,
    built: bool,
}

impl AnnForest {
    /// Creates an empty forest with the default leaf capacity `max(1, dimension / 2)`.
    ///
    /// # Errors
    /// `InvalidParameter` if `dimension` is 0.
    pub fn new(dimension: usize) -> Result<Self, ForestError> {
        Self::with_leaf_capacity(dimension, default_leaf_capacity(dimension))
    }

    /// Creates an empty forest whose leaves hold at most `leaf_capacity` items.
    ///
    /// # Errors
    /// `InvalidParameter` if `dimension` or `leaf_capacity` is 0.
    pub fn with_leaf_capacity(dimension: usize, leaf_capacity: usize) -> Result<Self, ForestError> {
        if dimension == 0 {
            return Err(ForestError::InvalidParameter("dimension must be greater than 0".to_string()));
        }
        if leaf_capacity == 0 {
            return Err(ForestError::InvalidParameter(
                "leaf capacity must be greater than 0".to_string(),
            ));
        }
        Ok(Self { dimension, leaf_capacity, vectors: Vec::new(), trees: Vec::new(), built: false })
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub const fn leaf_capacity(&self) -> usize {
        self.leaf_capacity
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len() / self.dimension
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    #[must_use]
    pub const fn is_built(&self) -> bool {
        self.built
    }

    #[must_use]
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    #[must_use]
    pub fn trees(&self) -> &[ProjectionTree] {
        &self.trees
    }

    /// Adds (or, before `build`, replaces) the vector for `id`.
    ///
    /// Ids are dense: `id` must be an existing id or exactly `len()`.
    ///
    /// # Errors
    /// `AlreadyBuilt` after `build`; `DimensionMismatch` for a wrong-length vector;
    /// `InvalidParameter` for a non-finite component or a gap in the id sequence.
    pub fn add_item(&mut self, id: ItemId, vector: &[f32]) -> Result<(), ForestError> {
        if self.built {
            return Err(ForestError::AlreadyBuilt);
        }
        if vector.len() != self.dimension {
            return Err(ForestError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        if !vector.iter().all(|x| x.is_finite()) {
            return Err(ForestError::InvalidParameter(format!(
                "vector for item {id} contains NaN or infinite values"
            )));
        }

        let index = id as usize;
        let len = self.len();
        if index < len {
            let start = index * self.dimension;
            self.vectors[start..start + self.dimension].copy_from_slice(vector);
        } else if index == len {
            if u32::try_from(len).is_err() {
                return Err(ForestError::InvalidParameter("forest is full".to_string()));
            }
            self.vectors.extend_from_slice(vector);
        } else {
            return Err(ForestError::InvalidParameter(format!(
                "item ids must be dense: next id is {len}, got {id}"
            )));
        }
        Ok(())
    }

    /// Builds `num_trees` trees over all items, in parallel.
    ///
    /// Each tree draws from its own generator seeded from `seed`, so the result
    /// is fully determined by the items, the parameters and `seed`.
    ///
    /// # Errors
    /// `AlreadyBuilt` if called twice; `InvalidParameter` if `num_trees` is 0.
    pub fn build(&mut self, num_trees: usize, seed: u64) -> Result<(), ForestError> {
        if self.built {
            return Err(ForestError::AlreadyBuilt);
        }
        if num_trees == 0 {
            return Err(ForestError::InvalidParameter("num_trees must be greater than 0".to_string()));
        }

        let started = Instant::now();
        let item_count = self.len();
        info!(
            trees = num_trees,
            items = item_count,
            leaf_capacity = self.leaf_capacity,
            "building forest"
        );

        let mut master = StdRng::seed_from_u64(seed);
        let tree_seeds: Vec<u64> = (0..num_trees).map(|_| master.gen()).collect();
        let table = VectorTable::new(&self.vectors, self.dimension);
        let leaf_capacity = self.leaf_capacity;

        let trees: Vec<ProjectionTree> = tree_seeds
            .into_par_iter()
            .map(|tree_seed| {
                let mut rng = StdRng::seed_from_u64(tree_seed);
                let all_items: Vec<ItemId> = (0..item_count).map(|i| i as ItemId).collect();
                builder::build_tree(&table, all_items, leaf_capacity, &mut rng)
            })
            .collect();

        for (i, tree) in trees.iter().enumerate() {
            debug!(tree = i, nodes = tree.node_count(), depth = tree.depth(), "tree built");
        }
        self.trees = trees;
        self.built = true;

        info!(elapsed_ms = started.elapsed().as_millis(), "forest built");
        Ok(())
    }

    /// Stored vector of item `id`.
    ///
    /// # Errors
    /// `ItemOutOfRange` for an unknown id.
    pub fn get_item(&self, id: ItemId) -> Result<&[f32], ForestError> {
        if (id as usize) >= self.len() {
            return Err(ForestError::ItemOutOfRange(id));
        }
        Ok(self.table().get(id))
    }

    /// Approximate candidate ids for `query`, deduplicated across trees.
    ///
    /// Holds at least `num_results` ids whenever the forest has that many items
    /// and at most roughly `budget` (plus one leaf) for a limited budget.
    ///
    /// # Errors
    /// `NotBuilt` before `build`/`load`; `DimensionMismatch` for a wrong-length
    /// query; `InvalidParameter` for a non-finite query component.
    pub fn search_candidates(
        &self,
        query: &[f32],
        num_results: usize,
        budget: SearchBudget,
    ) -> Result<Vec<ItemId>, ForestError> {
        if !self.built {
            return Err(ForestError::NotBuilt);
        }
        if query.len() != self.dimension {
            return Err(ForestError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if !query.iter().all(|x| x.is_finite()) {
            return Err(ForestError::InvalidParameter(
                "query vector contains NaN or infinite values".to_string(),
            ));
        }

        let outcome = search::find_candidates(&self.trees, query, num_results, budget);
        debug!(
            candidates = outcome.candidates.len(),
            peak_frontier = outcome.peak_frontier,
            ?budget,
            "candidate search finished"
        );
        Ok(outcome.candidates)
    }

    fn table(&self) -> VectorTable<'_> {
        VectorTable::new(&self.vectors, self.dimension)
    }
}

/// Default leaf capacity for a dimensionality.
#[must_use]
pub const fn default_leaf_capacity(dimension: usize) -> usize {
    if dimension / 2 > 1 {
        dimension / 2
    } else {
        1
    }
}
