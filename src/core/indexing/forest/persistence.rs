// src/core/indexing/forest/persistence.rs

//! On-disk format of a built forest.
//!
//! Layout: a fixed header (magic, format version, dimension, leaf capacity)
//! followed by the body (flat vector table and every tree's node arena), both
//! bincode-encoded with fixed-width integers. Nothing is trusted on load: the
//! header and every tree are validated before a forest is handed out.

use super::tree::{ProjectionTree, TreeNode};
use super::{AnnForest, ForestError};
use crate::core::common::codec::options as codec;
use crate::core::types::ItemId;
use bincode::Options;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

const MAGIC: [u8; 8] = *b"WVFOREST";
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    magic: [u8; 8],
    version: u32,
    dimension: u64,
    leaf_capacity: u64,
}

#[derive(Debug, Deserialize)]
struct Body {
    vectors: Vec<f32>,
    trees: Vec<ProjectionTree>,
}

/// Borrowed twin of [`Body`]; encodes to the same bytes.
#[derive(Serialize)]
struct BodyRef<'a> {
    vectors: &'a [f32],
    trees: &'a [ProjectionTree],
}

impl AnnForest {
    /// Writes the built forest to `path`, replacing any existing file.
    ///
    /// # Errors
    /// `BuildInvariantViolation` if the forest is not built; `Io` or
    /// `Serialization` if writing fails.
    pub fn save(&self, path: impl AsRef<Path>) -> crate::Result<()> {
        if !self.built {
            return Err(ForestError::NotBuilt.into());
        }
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);

        let header = Header {
            magic: MAGIC,
            version: FORMAT_VERSION,
            dimension: self.dimension as u64,
            leaf_capacity: self.leaf_capacity as u64,
        };
        codec().serialize_into(&mut writer, &header)?;
        codec().serialize_into(&mut writer, &BodyRef { vectors: &self.vectors, trees: &self.trees })?;
        writer.flush()?;

        info!(path = %path.display(), items = self.len(), trees = self.trees.len(), "forest saved");
        Ok(())
    }

    /// Reads a forest written by [`AnnForest::save`]. The result is built and
    /// answers queries exactly as the saved forest did.
    ///
    /// # Errors
    /// `Io` if the file cannot be read; `Serialization` if it is truncated,
    /// malformed or fails structural validation.
    pub fn load(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::new(file);
        let header: Header = codec().with_limit(file_len).deserialize_from(&mut reader)?;
        if header.magic != MAGIC {
            return Err(ForestError::Corrupt("bad magic bytes".to_string()).into());
        }
        if header.version != FORMAT_VERSION {
            return Err(ForestError::Corrupt(format!(
                "unsupported format version {}",
                header.version
            ))
            .into());
        }
        let dimension = usize::try_from(header.dimension)
            .map_err(|_| ForestError::Corrupt("dimension does not fit in memory".to_string()))?;
        let leaf_capacity = usize::try_from(header.leaf_capacity)
            .map_err(|_| ForestError::Corrupt("leaf capacity does not fit in memory".to_string()))?;
        if dimension == 0 {
            return Err(ForestError::Corrupt("dimension is 0".to_string()).into());
        }
        if leaf_capacity == 0 {
            return Err(ForestError::Corrupt("leaf capacity is 0".to_string()).into());
        }

        let body: Body = codec().with_limit(file_len).deserialize_from(&mut reader)?;
        if body.vectors.len() % dimension != 0 {
            return Err(ForestError::Corrupt(format!(
                "vector table of {} floats is not a multiple of dimension {dimension}",
                body.vectors.len()
            ))
            .into());
        }
        if body.trees.is_empty() {
            return Err(ForestError::Corrupt("forest has no trees".to_string()).into());
        }
        let item_count = body.vectors.len() / dimension;
        for (t, tree) in body.trees.iter().enumerate() {
            validate_tree(tree, dimension, item_count)
                .map_err(|reason| ForestError::Corrupt(format!("tree {t}: {reason}")))?;
        }

        info!(path = %path.display(), items = item_count, trees = body.trees.len(), "forest loaded");
        Ok(Self { dimension, leaf_capacity, vectors: body.vectors, trees: body.trees, built: true })
    }
}

/// Checks that `tree` is a proper binary tree over exactly the items
/// `0..item_count`, each appearing in one leaf.
fn validate_tree(tree: &ProjectionTree, dimension: usize, item_count: usize) -> Result<(), String> {
    let node_count = tree.nodes.len();
    if (tree.root as usize) >= node_count {
        return Err(format!("root {} out of range", tree.root));
    }

    let mut parents = vec![0u32; node_count];
    let mut item_seen = vec![false; item_count];
    let mut items_total = 0usize;

    for (index, node) in tree.nodes.iter().enumerate() {
        match node {
            TreeNode::Internal { hyperplane, left, right } => {
                if hyperplane.normal.len() != dimension {
                    return Err(format!(
                        "node {index} normal has length {}, expected {dimension}",
                        hyperplane.normal.len()
                    ));
                }
                for child in [*left, *right] {
                    let slot = parents
                        .get_mut(child as usize)
                        .ok_or_else(|| format!("node {index} child {child} out of range"))?;
                    *slot += 1;
                }
            }
            TreeNode::Leaf { items } => {
                for &id in items {
                    let seen = item_seen
                        .get_mut(id as usize)
                        .ok_or_else(|| format!("leaf {index} holds unknown item {id}"))?;
                    if *seen {
                        return Err(format!("item {id} appears in more than one leaf"));
                    }
                    *seen = true;
                    items_total += 1;
                }
            }
        }
    }

    for (index, &count) in parents.iter().enumerate() {
        let expected = u32::from(index != tree.root as usize);
        if count != expected {
            return Err(format!("node {index} has {count} parents, expected {expected}"));
        }
    }
    // With single parents established, a walk from the root terminates; it
    // must reach every node or some subtree hangs off a detached cycle.
    let mut reached = 0usize;
    let mut stack = vec![tree.root];
    while let Some(id) = stack.pop() {
        reached += 1;
        if let Some(TreeNode::Internal { left, right, .. }) = tree.node(id) {
            stack.push(*left);
            stack.push(*right);
        }
    }
    if reached != node_count {
        return Err(format!("{} nodes are unreachable from the root", node_count - reached));
    }
    if items_total != item_count {
        let missing = item_seen.iter().position(|seen| !seen).unwrap_or(0) as ItemId;
        return Err(format!("item {missing} is missing from every leaf"));
    }
    Ok(())
}
