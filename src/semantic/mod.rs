//! Semantic search over the enriched catalog.
//!
//! # Architecture
//!
//! - `embeddings`: Client for the remote embedding service
//! - `similarity`: Cosine similarity between vectors
//! - `search`: Query embedding and top-K ranking

pub mod embeddings;
mod search;
mod similarity;

pub use embeddings::{Embedder, EmbeddingError, HttpEmbedder};
pub use search::{SearchEngine, DEFAULT_TOP_K};
