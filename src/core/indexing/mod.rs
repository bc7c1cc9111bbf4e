pub mod forest;
pub mod pipeline;

pub use forest::{AnnForest, ForestError, SearchBudget};
pub use pipeline::{build_forest, BuildParams};
