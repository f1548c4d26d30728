//! Embedding provider trait and the failure-policy adapter.

use async_trait::async_trait;
use tracing::warn;

use crate::config::EmbeddingFailurePolicy;
use crate::error::Result;

/// What an embedding will be used for.
///
/// Providers that distinguish document and query embeddings (Gemini's
/// `taskType`, for instance) can produce better-matched vectors when told
/// which side of the search the text is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingPurpose {
    /// The text is a document chunk being stored for later retrieval.
    Document,
    /// The text is a user question being matched against stored chunks.
    Query,
}

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface. The default [`embed_batch`](Embedder::embed_batch)
/// implementation calls [`embed`](Embedder::embed) sequentially; backends
/// that support native batching should override it.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str, purpose: EmbeddingPurpose) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// The default implementation calls [`embed`](Embedder::embed)
    /// sequentially for each input. Override this method if the backend
    /// supports native batch embedding for better throughput.
    async fn embed_batch(&self, texts: &[&str], purpose: EmbeddingPurpose) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text, purpose).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// A short name for the provider, used in logs and error messages.
    fn name(&self) -> &str;
}

/// Wraps an [`Embedder`] and applies the configured
/// [`EmbeddingFailurePolicy`] to every call.
///
/// Under [`EmbeddingFailurePolicy::ZeroVector`] a failed request yields an
/// all-zero vector of the provider's dimensionality instead of an error, so
/// one bad request never aborts a whole indexing run. Under
/// [`EmbeddingFailurePolicy::Propagate`] errors pass through unchanged.
pub struct EmbeddingAdapter {
    inner: Box<dyn Embedder>,
    policy: EmbeddingFailurePolicy,
}

impl EmbeddingAdapter {
    /// Wrap `inner` with the given failure policy.
    pub fn new(inner: Box<dyn Embedder>, policy: EmbeddingFailurePolicy) -> Self {
        Self { inner, policy }
    }

    /// The failure policy applied by this adapter.
    pub fn policy(&self) -> EmbeddingFailurePolicy {
        self.policy
    }

    fn absorb(&self, result: Result<Vec<f32>>, purpose: EmbeddingPurpose) -> Result<Vec<f32>> {
        match (result, self.policy) {
            (Ok(v), _) => Ok(v),
            (Err(e), EmbeddingFailurePolicy::Propagate) => Err(e),
            (Err(e), EmbeddingFailurePolicy::ZeroVector) => {
                warn!(
                    provider = self.inner.name(),
                    purpose = ?purpose,
                    error = %e,
                    "embedding failed, substituting zero vector"
                );
                Ok(vec![0.0; self.inner.dimensions()])
            }
        }
    }
}

#[async_trait]
impl Embedder for EmbeddingAdapter {
    async fn embed(&self, text: &str, purpose: EmbeddingPurpose) -> Result<Vec<f32>> {
        let result = self.inner.embed(text, purpose).await;
        self.absorb(result, purpose)
    }

    async fn embed_batch(&self, texts: &[&str], purpose: EmbeddingPurpose) -> Result<Vec<Vec<f32>>> {
        // Absorb per item, not per batch, so one failed text cannot take
        // its neighbours down with it.
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            let result = self.inner.embed(text, purpose).await;
            results.push(self.absorb(result, purpose)?);
        }
        Ok(results)
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Whether `embedding` is the all-zero fallback vector.
pub fn is_zero_vector(embedding: &[f32]) -> bool {
    embedding.iter().all(|v| *v == 0.0)
}
