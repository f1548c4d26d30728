//! Vector index trait for storing and searching chunk embeddings.

use async_trait::async_trait;

use crate::document::{Chunk, SearchResult};
use crate::error::Result;

/// A storage backend for embedded chunks with similarity search.
///
/// The pipeline writes chunks through [`upsert`](VectorIndex::upsert) and
/// the query engine reads them back through [`query`](VectorIndex::query).
/// The index holds a single collection; re-upserting an existing chunk ID
/// replaces the stored entry.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Upsert chunks into the index. Chunks must have embeddings set.
    async fn upsert(&self, chunks: &[Chunk]) -> Result<()>;

    /// Search for the `top_k` most similar chunks to the given embedding.
    ///
    /// Returns results ordered by descending similarity score; fewer than
    /// `top_k` when the index holds fewer chunks, and an empty `Vec` when
    /// it holds none.
    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>>;

    /// Number of chunks currently stored.
    async fn len(&self) -> usize;

    /// Whether the index holds at least one chunk and can serve queries.
    async fn is_ready(&self) -> bool {
        self.len().await > 0
    }
}
