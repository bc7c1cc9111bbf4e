// src/core/indexing/forest/builder.rs

//! Construction of one random-projection tree.

use super::tree::{Hyperplane, NodeId, ProjectionTree, TreeNode, VectorTable};
use crate::core::types::ItemId;
use crate::core::vector::{dot, normalized};
use rand::rngs::StdRng;
use rand::Rng;

/// Random pair resamples before a split is forced through the median.
const MAX_SPLIT_ATTEMPTS: usize = 5;

/// Result of partitioning one node's items.
struct Split {
    hyperplane: Hyperplane,
    left: Vec<ItemId>,
    right: Vec<ItemId>,
}

/// Builds a tree over `items`, splitting until every leaf holds at most
/// `leaf_capacity` ids.
///
/// Nodes are expanded depth-first from an explicit work stack, so a badly
/// skewed split sequence cannot exhaust the call stack. Every split produces
/// two non-empty children strictly smaller than their parent, which bounds
/// the number of iterations.
pub fn build_tree(
    table: &VectorTable<'_>,
    items: Vec<ItemId>,
    leaf_capacity: usize,
    rng: &mut StdRng,
) -> ProjectionTree {
    debug_assert!(leaf_capacity >= 1);

    let mut nodes = vec![TreeNode::Leaf { items: Vec::new() }];
    let mut pending: Vec<(NodeId, Vec<ItemId>)> = vec![(0, items)];

    while let Some((slot, node_items)) = pending.pop() {
        if node_items.len() <= leaf_capacity {
            nodes[slot as usize] = TreeNode::Leaf { items: node_items };
            continue;
        }

        let Split { hyperplane, left, right } = split_items(table, &node_items, rng);
        debug_assert!(!left.is_empty() && !right.is_empty());

        let left_id = nodes.len() as NodeId;
        let right_id = left_id + 1;
        nodes.push(TreeNode::Leaf { items: Vec::new() });
        nodes.push(TreeNode::Leaf { items: Vec::new() });
        nodes[slot as usize] = TreeNode::Internal { hyperplane, left: left_id, right: right_id };

        // Left is popped first.
        pending.push((right_id, right));
        pending.push((left_id, left));
    }

    ProjectionTree::from_parts(nodes, 0)
}

/// Picks a hyperplane for `items` (at least two of them) and partitions by it.
fn split_items(table: &VectorTable<'_>, items: &[ItemId], rng: &mut StdRng) -> Split {
    let mut fallback_normal = None;

    for _ in 0..MAX_SPLIT_ATTEMPTS {
        let Some(normal) = sample_normal(table, items, rng) else {
            continue;
        };
        let hyperplane = Hyperplane { normal, offset: 0.0 };
        let (left, right): (Vec<ItemId>, Vec<ItemId>) =
            items.iter().partition(|&&id| !hyperplane.is_positive(table.get(id)));

        if !left.is_empty() && !right.is_empty() {
            return Split { hyperplane, left, right };
        }
        fallback_normal = Some(hyperplane.normal);
    }

    let normal = fallback_normal.unwrap_or_else(|| random_direction(table.dimension(), rng));
    median_split(table, items, normal)
}

/// Normal of the bisector between two distinct sampled items' unit vectors.
///
/// `None` when either sample has zero norm or both point the same way.
fn sample_normal(table: &VectorTable<'_>, items: &[ItemId], rng: &mut StdRng) -> Option<Vec<f32>> {
    let i = rng.gen_range(0..items.len());
    let mut j = rng.gen_range(0..items.len() - 1);
    if j >= i {
        j += 1;
    }

    let u = normalized(table.get(items[i]))?;
    let v = normalized(table.get(items[j]))?;
    let diff: Vec<f32> = u.iter().zip(&v).map(|(a, b)| a - b).collect();
    normalized(&diff)
}

/// Forced balanced split: sort by projection onto `normal` (ties by id) and
/// cut at the median index. Both halves are non-empty for two or more items.
///
/// Left items have margin `<= 0` and right items `>= 0`. When the projections
/// at the cut are tied, left items lie exactly on the plane and
/// [`Hyperplane::is_positive`] would route them right; the stored partition,
/// not the plane, decides where those items live. Search is unaffected since
/// the far side of every node is still reachable through the frontier.
fn median_split(table: &VectorTable<'_>, items: &[ItemId], normal: Vec<f32>) -> Split {
    let mut projected: Vec<(f32, ItemId)> =
        items.iter().map(|&id| (dot(&normal, table.get(id)), id)).collect();
    projected.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let mid = projected.len() / 2;
    let offset = (projected[mid - 1].0 + projected[mid].0) / 2.0;
    let right = projected.split_off(mid).into_iter().map(|(_, id)| id).collect();
    let left = projected.into_iter().map(|(_, id)| id).collect();

    Split { hyperplane: Hyperplane { normal, offset }, left, right }
}

/// Uniformly random unit direction; falls back to the first axis if the draw
/// comes out degenerate.
fn random_direction(dimension: usize, rng: &mut StdRng) -> Vec<f32> {
    let draw: Vec<f32> = (0..dimension).map(|_| rng.gen_range(-1.0f32..1.0)).collect();
    normalized(&draw).unwrap_or_else(|| {
        let mut axis = vec![0.0; dimension];
        axis[0] = 1.0;
        axis
    })
}
