use thiserror::Error;

/// Errors surfaced by the vector similarity engine and the layers around it.
///
/// Every failure kind a caller needs to distinguish has its own variant; lookups
/// that fail part-way through a request abort the whole request with one of these.
#[derive(Debug, Error)]
pub enum WordVecError {
    /// A keyword or item id is absent from the store or the forest.
    #[error("Not Found: {0}")]
    NotFound(String),

    /// A supplied vector does not have the configured dimensionality.
    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// None of the query keywords resolved to a vector.
    #[error("No matching keyword: {0}")]
    EmptyQuery(String),

    /// A zero-norm vector made a cosine similarity undefined.
    #[error("Degenerate vector: {0}")]
    DegenerateVector(String),

    /// Forest lifecycle misuse: build twice, add after build, search before build.
    #[error("Build invariant violated: {0}")]
    BuildInvariantViolation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization Error: {0}")]
    Serialization(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<bincode::Error> for WordVecError {
    fn from(err: bincode::Error) -> Self {
        match *err {
            bincode::ErrorKind::Io(e) => Self::Io(e),
            other => Self::Serialization(other.to_string()),
        }
    }
}

impl WordVecError {
    /// Shorthand for a `NotFound` on a keyword.
    #[must_use]
    pub fn keyword_not_found(keyword: &str) -> Self {
        Self::NotFound(format!("keyword '{keyword}'"))
    }

    /// Shorthand for a `NotFound` on an item id.
    #[must_use]
    pub fn item_not_found(id: u32) -> Self {
        Self::NotFound(format!("item id {id}"))
    }
}
