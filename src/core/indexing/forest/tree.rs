// src/core/indexing/forest/tree.rs

//! Node layout of a single random-projection tree.

use crate::core::types::ItemId;
use crate::core::vector::dot;
use serde::{Deserialize, Serialize};

/// Index of a node inside its tree's arena.
pub type NodeId = u32;

/// Splitting plane: `p` is on the positive side iff `dot(normal, p) - offset >= 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperplane {
    pub normal: Vec<f32>,
    pub offset: f32,
}

impl Hyperplane {
    /// Signed distance-like margin of `point` relative to the plane.
    #[inline]
    #[must_use]
    pub fn margin(&self, point: &[f32]) -> f32 {
        dot(&self.normal, point) - self.offset
    }

    /// `true` when `point` belongs in the right (non-negative) child.
    #[inline]
    #[must_use]
    pub fn is_positive(&self, point: &[f32]) -> bool {
        self.margin(point) >= 0.0
    }
}

/// A tree node. Internal nodes route by hyperplane; leaves hold item ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Internal {
        hyperplane: Hyperplane,
        /// Negative-side child.
        left: NodeId,
        /// Non-negative-side child.
        right: NodeId,
    },
    Leaf {
        items: Vec<ItemId>,
    },
}

/// One tree of the forest, stored as a flat arena of nodes.
///
/// The tree never owns item vectors. Whoever builds or searches it lends the
/// forest's shared vector table for the duration of the call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionTree {
    pub(super) nodes: Vec<TreeNode>,
    pub(super) root: NodeId,
}

impl ProjectionTree {
    pub(super) const fn from_parts(nodes: Vec<TreeNode>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Looks up a node by arena index.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id as usize)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Iterates over the item lists of every leaf.
    pub fn leaves(&self) -> impl Iterator<Item = &[ItemId]> {
        self.nodes.iter().filter_map(|node| match node {
            TreeNode::Leaf { items } => Some(items.as_slice()),
            TreeNode::Internal { .. } => None,
        })
    }

    /// Longest root-to-leaf path, counted in edges.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            match self.node(id) {
                Some(TreeNode::Internal { left, right, .. }) => {
                    stack.push((*left, depth + 1));
                    stack.push((*right, depth + 1));
                }
                Some(TreeNode::Leaf { .. }) | None => max_depth = max_depth.max(depth),
            }
        }
        max_depth
    }
}

/// Borrowed view over the forest's flat `id * dimension` vector table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct VectorTable<'a> {
    data: &'a [f32],
    dimension: usize,
}

impl<'a> VectorTable<'a> {
    pub(crate) fn new(data: &'a [f32], dimension: usize) -> Self {
        debug_assert!(dimension > 0 && data.len() % dimension == 0);
        Self { data, dimension }
    }

    pub(crate) const fn dimension(&self) -> usize {
        self.dimension
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    /// Vector of item `id`. Callers only pass ids below `len()`.
    pub(crate) fn get(&self, id: ItemId) -> &'a [f32] {
        let start = id as usize * self.dimension;
        &self.data[start..start + self.dimension]
    }
}
