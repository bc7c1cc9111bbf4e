pub mod common;
pub mod config;
pub mod indexing;
pub mod query;
pub mod segment;
pub mod store;
pub mod types;
pub mod vector;

pub use self::config::Config;
