//! Indexing pipeline orchestrator.
//!
//! The [`IndexingPipeline`] turns a directory of PDF files into a
//! populated [`VectorIndex`] by composing discovery, extraction, a
//! [`Chunker`], and an [`Embedder`].
//!
//! # Example
//!
//! ```rust,ignore
//! use askpdf_core::{IndexingPipeline, RagConfig, InMemoryIndex, SentenceChunker};
//!
//! let pipeline = IndexingPipeline::builder()
//!     .config(config.clone())
//!     .embedder(Arc::new(embedder))
//!     .index(Arc::new(InMemoryIndex::new(768)))
//!     .chunker(Arc::new(SentenceChunker::new(config.chunk_size, config.chunk_overlap)))
//!     .build()?;
//!
//! let report = pipeline.run(Path::new("./Document")).await?;
//! println!("indexed {} chunks", report.chunks_indexed);
//! ```

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::chunking::Chunker;
use crate::config::RagConfig;
use crate::document::{Chunk, Document};
use crate::embedding::{Embedder, EmbeddingPurpose};
use crate::error::{RagError, Result};
use crate::extract::{discover_pdfs, load_document};
use crate::index::VectorIndex;

/// A document that failed to index and was skipped.
#[derive(Debug)]
pub struct DocumentFailure {
    /// Path of the failed file.
    pub source_file: String,
    /// The error that caused the skip.
    pub error: RagError,
}

/// Summary of one indexing run.
#[derive(Debug, Default)]
pub struct IndexReport {
    /// Number of documents whose chunks were stored.
    pub documents_indexed: usize,
    /// Total chunks stored across all documents.
    pub chunks_indexed: usize,
    /// Documents that were skipped, with the error that skipped them.
    pub failures: Vec<DocumentFailure>,
}

/// The indexing pipeline orchestrator.
///
/// Coordinates document ingestion (discover → extract → chunk → embed →
/// store). A bad document is skipped and reported rather than aborting
/// the run; the run fails only when nothing at all could be indexed.
/// Construct one via [`IndexingPipeline::builder()`].
pub struct IndexingPipeline {
    config: RagConfig,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    chunker: Arc<dyn Chunker>,
}

impl IndexingPipeline {
    /// Create a new [`IndexingPipelineBuilder`].
    pub fn builder() -> IndexingPipelineBuilder {
        IndexingPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the vector index.
    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    /// Index every PDF found in `dir`.
    ///
    /// Documents that fail to load or ingest, or that contain no
    /// extractable text, are skipped, logged, and recorded in the
    /// returned [`IndexReport`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NoDocuments`] when the directory is missing
    /// (it is created first) or holds no PDF files, and
    /// [`RagError::PipelineError`] when every discovered document failed
    /// to produce indexable text.
    pub async fn run(&self, dir: &Path) -> Result<IndexReport> {
        let paths = discover_pdfs(dir).await?;
        info!(dir = %dir.display(), documents = paths.len(), "discovered documents");

        let mut report = IndexReport::default();

        for path in paths {
            let source_file = path.display().to_string();

            let document = match load_document(&path).await {
                Ok(document) => document,
                Err(e) => {
                    warn!(file = %source_file, error = %e, "skipping document");
                    report.failures.push(DocumentFailure { source_file, error: e });
                    continue;
                }
            };

            if document.is_empty() {
                warn!(document.id = %document.id, "document has no extractable text, skipping");
                report.failures.push(DocumentFailure {
                    source_file: source_file.clone(),
                    error: RagError::ExtractionError {
                        source_file,
                        message: "no extractable text".to_string(),
                    },
                });
                continue;
            }

            match self.ingest(&document).await {
                Ok(chunks) => {
                    report.documents_indexed += 1;
                    report.chunks_indexed += chunks.len();
                }
                Err(e) => {
                    warn!(file = %source_file, error = %e, "skipping document");
                    report.failures.push(DocumentFailure { source_file, error: e });
                }
            }
        }

        if report.chunks_indexed == 0 {
            error!(dir = %dir.display(), failures = report.failures.len(), "indexing produced nothing");
            return Err(RagError::PipelineError(format!(
                "no text could be indexed from {} ({} documents failed)",
                dir.display(),
                report.failures.len()
            )));
        }

        info!(
            documents = report.documents_indexed,
            chunks = report.chunks_indexed,
            failures = report.failures.len(),
            "indexing complete"
        );

        Ok(report)
    }

    /// Ingest a single document: chunk → embed → store.
    ///
    /// Returns the chunks that were stored (with embeddings attached).
    ///
    /// # Errors
    ///
    /// Returns [`RagError::PipelineError`] if embedding or storage fails,
    /// including the document ID in the error message.
    pub async fn ingest(&self, document: &Document) -> Result<Vec<Chunk>> {
        // 1. Chunk the document
        let mut chunks = self.chunker.chunk(document);
        if chunks.is_empty() {
            info!(document.id = %document.id, chunk_count = 0, "ingested document (empty)");
            return Ok(chunks);
        }

        // 2. Collect chunk texts for batch embedding
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();

        // 3. Generate embeddings
        let embeddings =
            self.embedder.embed_batch(&texts, EmbeddingPurpose::Document).await.map_err(|e| {
                error!(document.id = %document.id, error = %e, "embedding failed during ingestion");
                RagError::PipelineError(format!(
                    "embedding failed for document '{}': {e}",
                    document.id
                ))
            })?;

        // 4. Attach embeddings to chunks
        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        // 5. Upsert into the vector index
        self.index.upsert(&chunks).await.map_err(|e| {
            error!(document.id = %document.id, error = %e, "upsert failed during ingestion");
            RagError::PipelineError(format!("upsert failed for document '{}': {e}", document.id))
        })?;

        let chunk_count = chunks.len();
        info!(document.id = %document.id, chunk_count, "ingested document");

        Ok(chunks)
    }
}

/// Builder for constructing an [`IndexingPipeline`].
///
/// All fields are required. Call [`build()`](IndexingPipelineBuilder::build)
/// to validate and produce the pipeline.
#[derive(Default)]
pub struct IndexingPipelineBuilder {
    config: Option<RagConfig>,
    embedder: Option<Arc<dyn Embedder>>,
    index: Option<Arc<dyn VectorIndex>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl IndexingPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector index backend.
    pub fn index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`IndexingPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required field is missing.
    pub fn build(self) -> Result<IndexingPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::ConfigError("config is required".to_string()))?;
        let embedder = self
            .embedder
            .ok_or_else(|| RagError::ConfigError("embedder is required".to_string()))?;
        let index =
            self.index.ok_or_else(|| RagError::ConfigError("index is required".to_string()))?;
        let chunker =
            self.chunker.ok_or_else(|| RagError::ConfigError("chunker is required".to_string()))?;

        Ok(IndexingPipeline { config, embedder, index, chunker })
    }
}
