//! Context Retrieval
//!
//! Supplies past content in the target voice so the generator can match it.

mod corpus;

pub use corpus::{chunk_text, ChunkingConfig, CorpusRetriever};

use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait Retriever: Send + Sync {
    /// Up to `limit` snippets, best match first
    async fn retrieve(&self, query: &str, limit: usize) -> Result<Vec<String>>;

    /// Add published content so later cycles can draw on it
    async fn store(&self, text: &str) -> Result<()>;
}
