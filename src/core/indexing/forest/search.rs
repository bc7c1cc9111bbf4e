// src/core/indexing/forest/search.rs

//! Best-first candidate search across every tree of the forest at once.

use super::tree::{NodeId, ProjectionTree, TreeNode};
use crate::core::types::ItemId;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// Cap on distinct candidate items gathered by one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBudget {
    /// Stop once this many distinct candidates are collected.
    Limited(usize),
    /// Visit every leaf of every tree.
    Unbounded,
}

impl SearchBudget {
    /// Maps a raw budget where any non-positive value means "no cap".
    #[must_use]
    pub fn from_raw(raw: i64) -> Self {
        usize::try_from(raw).ok().filter(|&b| b > 0).map_or(Self::Unbounded, Self::Limited)
    }

    /// Effective candidate limit. A positive budget never stops the search
    /// before `num_results` candidates are available.
    const fn limit(self, num_results: usize) -> Option<usize> {
        match self {
            Self::Limited(budget) => {
                Some(if budget > num_results { budget } else { num_results })
            }
            Self::Unbounded => None,
        }
    }
}

/// Pending node in the frontier.
///
/// Ordered by priority, then by push order (later first), so the preferred
/// child just pushed at `+inf` is descended before any other `+inf` entry.
#[derive(Debug, Clone, Copy)]
struct FrontierEntry {
    priority: f32,
    seq: u64,
    tree: usize,
    node: NodeId,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority.total_cmp(&other.priority).then(self.seq.cmp(&other.seq))
    }
}

/// Max-priority queue of nodes still to expand.
///
/// Each expanded internal node adds one net entry, so the queue never holds
/// more than `trees + expanded internal nodes` entries. Every split has two
/// non-empty children, so a tree over `n` items has at most `n - 1` internal
/// nodes and the queue is bounded by `trees * max(n, 1)` entries. It is not
/// truncated to the budget: dropping far entries would let a smaller budget
/// visit leaves a larger one skips.
#[derive(Debug, Default)]
struct Frontier {
    heap: BinaryHeap<FrontierEntry>,
    next_seq: u64,
    peak: usize,
}

impl Frontier {
    fn with_capacity(capacity: usize) -> Self {
        Self { heap: BinaryHeap::with_capacity(capacity), next_seq: 0, peak: 0 }
    }

    fn push(&mut self, priority: f32, tree: usize, node: NodeId) {
        self.heap.push(FrontierEntry { priority, seq: self.next_seq, tree, node });
        self.next_seq += 1;
        self.peak = self.peak.max(self.heap.len());
    }

    fn pop(&mut self) -> Option<FrontierEntry> {
        self.heap.pop()
    }
}

/// Outcome of one candidate search.
#[derive(Debug)]
pub(super) struct SearchOutcome {
    pub candidates: Vec<ItemId>,
    /// Largest number of pending nodes held at once.
    pub peak_frontier: usize,
}

/// Collects deduplicated candidate ids for `query`, in discovery order.
///
/// The order in which leaves are reached depends only on the forest and the
/// query, never on the budget, so a larger budget always yields a superset.
pub(super) fn find_candidates(
    trees: &[ProjectionTree],
    query: &[f32],
    num_results: usize,
    budget: SearchBudget,
) -> SearchOutcome {
    let limit = budget.limit(num_results);
    let mut frontier = Frontier::with_capacity(trees.len() * 2);
    let mut seen: HashSet<ItemId> = HashSet::with_capacity(limit.unwrap_or(0));
    let mut candidates = Vec::with_capacity(limit.unwrap_or(0));

    // Reverse so tree 0 is expanded first among the equal-priority roots.
    for (t, tree) in trees.iter().enumerate().rev() {
        frontier.push(f32::INFINITY, t, tree.root());
    }

    while let Some(entry) = frontier.pop() {
        if limit.is_some_and(|limit| candidates.len() >= limit) {
            break;
        }

        match trees[entry.tree].node(entry.node) {
            Some(TreeNode::Leaf { items }) => {
                for &id in items {
                    if seen.insert(id) {
                        candidates.push(id);
                    }
                }
            }
            Some(TreeNode::Internal { hyperplane, left, right }) => {
                let margin = hyperplane.margin(query);
                let (near, far) = if margin >= 0.0 { (*right, *left) } else { (*left, *right) };
                frontier.push(-margin.abs(), entry.tree, far);
                frontier.push(f32::INFINITY, entry.tree, near);
            }
            None => {}
        }
    }

    SearchOutcome { candidates, peak_frontier: frontier.peak }
}
