// src/core/indexing/forest/error.rs

use crate::core::common::WordVecError;
use crate::core::types::ItemId;
use thiserror::Error;

/// Errors raised by forest construction, search and persistence.
#[derive(Debug, Error)]
pub enum ForestError {
    /// `build` was called on a forest that already has trees.
    #[error("forest is already built")]
    AlreadyBuilt,
    /// Search or item lookup before `build`/`load`.
    #[error("forest is not built; call build() or load() first")]
    NotBuilt,
    #[error("vector dimension mismatch: forest expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("item id {0} is out of range")]
    ItemOutOfRange(ItemId),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// A serialized forest failed structural validation on load.
    #[error("corrupt forest file: {0}")]
    Corrupt(String),
}

impl From<ForestError> for WordVecError {
    fn from(err: ForestError) -> Self {
        match err {
            ForestError::AlreadyBuilt | ForestError::NotBuilt => {
                Self::BuildInvariantViolation(err.to_string())
            }
            ForestError::DimensionMismatch { expected, actual } => {
                Self::DimensionMismatch { expected, actual }
            }
            ForestError::ItemOutOfRange(id) => Self::item_not_found(id),
            ForestError::InvalidParameter(s) => Self::InvalidInput(s),
            ForestError::Corrupt(s) => Self::Serialization(s),
        }
    }
}
