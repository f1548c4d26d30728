//! Question answering over the vector index.
//!
//! The [`QueryEngine`] takes a question through the fixed sequence
//! validate → embed → retrieve → prompt → generate. Validation happens
//! before any network call: an empty question and an empty index are
//! both rejected without spending an embedding request.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::RagConfig;
use crate::document::SearchResult;
use crate::embedding::{Embedder, EmbeddingPurpose};
use crate::error::{RagError, Result};
use crate::generation::TextGenerator;
use crate::index::VectorIndex;

/// Assemble the grounding prompt for a question and its retrieved context.
///
/// Chunk texts are joined by blank lines in retrieval order. The prompt
/// instructs the model to answer from the provided information and to say
/// so when the answer is not there.
pub fn grounding_prompt(query: &str, results: &[SearchResult]) -> String {
    let context = results.iter().map(|r| r.chunk.text.as_str()).collect::<Vec<_>>().join("\n\n");
    format!(
        "Based on the following information from the document:\n\n{context}\n\n\
         Please answer this question: {query}\n\n\
         If the answer cannot be found in the provided information, please say so."
    )
}

/// The question-answering engine.
///
/// Composes an [`Embedder`], a [`VectorIndex`], and a [`TextGenerator`]
/// into a single [`answer`](QueryEngine::answer) call. Construct one via
/// [`QueryEngine::builder()`].
pub struct QueryEngine {
    config: RagConfig,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    generator: Arc<dyn TextGenerator>,
}

impl QueryEngine {
    /// Create a new [`QueryEngineBuilder`].
    pub fn builder() -> QueryEngineBuilder {
        QueryEngineBuilder::default()
    }

    /// Return a reference to the engine configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Answer a question from the indexed documents.
    ///
    /// Retrieves the `top_k` most relevant chunks, grounds the question
    /// in them, and returns the generated answer text.
    ///
    /// # Errors
    ///
    /// - [`RagError::EmptyQuery`] if the question is empty or whitespace.
    /// - [`RagError::NotIndexed`] if the index holds no chunks. This is
    ///   checked before the question is embedded.
    /// - Embedding, index, and generation failures propagate unchanged.
    pub async fn answer(&self, query: &str) -> Result<String> {
        // 1. Validate the question
        let query = query.trim();
        if query.is_empty() {
            return Err(RagError::EmptyQuery);
        }

        // 2. Refuse before embedding when nothing is indexed
        if !self.index.is_ready().await {
            return Err(RagError::NotIndexed);
        }

        // 3. Embed the question
        let query_embedding = self.embedder.embed(query, EmbeddingPurpose::Query).await?;
        debug!(dims = query_embedding.len(), "embedded question");

        // 4. Retrieve the most relevant chunks
        let results = self.index.query(&query_embedding, self.config.top_k).await?;
        debug!(results = results.len(), "retrieved context chunks");

        // 5. Ground the question and generate the answer
        let prompt = grounding_prompt(query, &results);
        let answer = self.generator.generate(&prompt).await?;

        info!(results = results.len(), answer_len = answer.len(), "answered question");

        Ok(answer)
    }
}

/// Builder for constructing a [`QueryEngine`].
///
/// All fields are required. Call [`build()`](QueryEngineBuilder::build)
/// to validate and produce the engine.
#[derive(Default)]
pub struct QueryEngineBuilder {
    config: Option<RagConfig>,
    embedder: Option<Arc<dyn Embedder>>,
    index: Option<Arc<dyn VectorIndex>>,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl QueryEngineBuilder {
    /// Set the engine configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector index to retrieve from.
    pub fn index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the answer generation provider.
    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Build the [`QueryEngine`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required field is missing.
    pub fn build(self) -> Result<QueryEngine> {
        let config =
            self.config.ok_or_else(|| RagError::ConfigError("config is required".to_string()))?;
        let embedder = self
            .embedder
            .ok_or_else(|| RagError::ConfigError("embedder is required".to_string()))?;
        let index =
            self.index.ok_or_else(|| RagError::ConfigError("index is required".to_string()))?;
        let generator = self
            .generator
            .ok_or_else(|| RagError::ConfigError("generator is required".to_string()))?;

        Ok(QueryEngine { config, embedder, index, generator })
    }
}
