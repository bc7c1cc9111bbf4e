//! Keyword and vector similarity queries on top of the forest and the store.

pub mod engine;

pub use engine::{QueryEngine, QueryOptions};
