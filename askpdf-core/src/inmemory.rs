//! In-memory vector index using cosine similarity.
//!
//! This module provides [`InMemoryIndex`], a vector index backed by a
//! `HashMap` protected by a `tokio::sync::RwLock`. The whole index lives
//! for one process run; nothing is persisted.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};
use crate::index::VectorIndex;

/// An in-memory vector index using cosine similarity for search.
///
/// Chunks are stored keyed by chunk ID, so upserting a chunk with an
/// existing ID replaces it. All operations are async-safe via
/// `tokio::sync::RwLock`.
#[derive(Debug)]
pub struct InMemoryIndex {
    dimensions: usize,
    chunks: RwLock<HashMap<String, Chunk>>,
}

impl InMemoryIndex {
    /// Create an empty index that accepts embeddings of `dimensions` length.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, chunks: RwLock::new(HashMap::new()) }
    }

    /// The embedding dimensionality this index accepts.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Compute cosine similarity between two vectors.
///
/// Both vectors are L2-normalized before computing the dot product.
/// Returns 0.0 if either vector has zero magnitude, so zero-vector
/// fallback embeddings never outrank real matches.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn upsert(&self, chunks: &[Chunk]) -> Result<()> {
        for chunk in chunks {
            if chunk.embedding.len() != self.dimensions {
                return Err(RagError::IndexError(format!(
                    "chunk '{}' has embedding of {} dimensions, index expects {}",
                    chunk.id,
                    chunk.embedding.len(),
                    self.dimensions
                )));
            }
        }

        let mut store = self.chunks.write().await;
        for chunk in chunks {
            store.insert(chunk.id.clone(), chunk.clone());
        }
        Ok(())
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        if embedding.len() != self.dimensions {
            return Err(RagError::IndexError(format!(
                "query embedding has {} dimensions, index expects {}",
                embedding.len(),
                self.dimensions
            )));
        }

        let store = self.chunks.read().await;
        let mut scored: Vec<SearchResult> = store
            .values()
            .map(|chunk| {
                let score = cosine_similarity(&chunk.embedding, embedding);
                SearchResult { chunk: chunk.clone(), score }
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn len(&self) -> usize {
        self.chunks.read().await.len()
    }
}
