//! HTTP surface of the similarity service.
//!
//! Routes, relative to the configured prefix (each also served with a
//! trailing slash):
//!
//! | Method | Path                               | Answer                     |
//! |--------|------------------------------------|----------------------------|
//! | GET    | `/get.similar.keywords`            | `{"keywords": [...]}`      |
//! | POST   | `/get.similar.keywords.from.vector`| `{"keywords": [...]}`      |
//! | GET    | `/get.word.vector`                 | `{"vector": [...]}`        |
//! | GET    | `/get.similarity.score`            | `{"score": x}`             |
//!
//! Failures answer `{"error": message}` with a status derived from the
//! error kind.

pub mod errors;
pub mod handlers;
pub mod server;
pub mod types;

pub use errors::ApiError;
pub use server::{router, serve};
