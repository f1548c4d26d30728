//! # askpdf-core
//!
//! Retrieval-augmented question answering over local PDF documents.
//!
//! ## Overview
//!
//! This crate turns a directory of PDF files into an in-memory vector
//! index and answers questions grounded in the retrieved text:
//!
//! - [`IndexingPipeline`] — discover → extract → chunk → embed → store
//! - [`QueryEngine`] — validate → embed → retrieve → prompt → generate
//! - [`GeminiEmbedder`] / [`GeminiGenerator`] — Gemini REST providers
//! - [`InMemoryIndex`] — cosine-similarity vector index
//!
//! The provider seams ([`Embedder`], [`TextGenerator`], [`VectorIndex`],
//! [`Chunker`]) are traits, so any stage can be swapped out or mocked.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use askpdf_core::{
//!     Embedder, EmbeddingAdapter, GeminiClient, GeminiEmbedder, GeminiGenerator,
//!     IndexingPipeline, InMemoryIndex, QueryEngine, RagConfig, SentenceChunker,
//! };
//!
//! # async fn run() -> askpdf_core::Result<()> {
//! let config = RagConfig::default();
//! let client = GeminiClient::from_env()?;
//! let embedder = Arc::new(EmbeddingAdapter::new(
//!     Box::new(GeminiEmbedder::new(client.clone())),
//!     config.on_embedding_failure,
//! ));
//! let index = Arc::new(InMemoryIndex::new(embedder.dimensions()));
//!
//! let pipeline = IndexingPipeline::builder()
//!     .config(config.clone())
//!     .embedder(embedder.clone())
//!     .index(index.clone())
//!     .chunker(Arc::new(SentenceChunker::new(config.chunk_size, config.chunk_overlap)))
//!     .build()?;
//! let report = pipeline.run(Path::new("./Document")).await?;
//!
//! let engine = QueryEngine::builder()
//!     .config(config)
//!     .embedder(embedder)
//!     .index(index)
//!     .generator(Arc::new(GeminiGenerator::new(client)))
//!     .build()?;
//! let answer = engine.answer("What is this document about?").await?;
//! # Ok(())
//! # }
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod extract;
pub mod gemini;
pub mod generation;
pub mod index;
pub mod inmemory;
pub mod pipeline;

pub use chunking::{Chunker, SentenceChunker, split_text};
pub use config::{EmbeddingFailurePolicy, RagConfig, RagConfigBuilder};
pub use document::{Chunk, Document, Page, SearchResult};
pub use embedding::{Embedder, EmbeddingAdapter, EmbeddingPurpose, is_zero_vector};
pub use engine::{QueryEngine, QueryEngineBuilder, grounding_prompt};
pub use error::{RagError, Result};
pub use extract::{discover_pdfs, load_document};
pub use gemini::{GeminiClient, GeminiEmbedder, GeminiGenerator};
pub use generation::TextGenerator;
pub use index::VectorIndex;
pub use inmemory::InMemoryIndex;
pub use pipeline::{DocumentFailure, IndexReport, IndexingPipeline, IndexingPipelineBuilder};
