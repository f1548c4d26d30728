//! Error types for the `askpdf-core` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while indexing documents or answering questions.
#[derive(Debug, Error)]
pub enum RagError {
    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The document directory contained nothing to index.
    #[error("No PDF documents found in {}", dir.display())]
    NoDocuments {
        /// The directory that was searched.
        dir: PathBuf,
        /// Whether the directory had to be created during discovery.
        created: bool,
    },

    /// An error occurred while extracting text from a source file.
    #[error("Extraction error ({source_file}): {message}")]
    ExtractionError {
        /// The file that failed to load.
        source_file: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector index.
    #[error("Index error: {0}")]
    IndexError(String),

    /// An error occurred during answer generation.
    #[error("Generation error ({provider}): {message}")]
    GenerationError {
        /// The text generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The submitted question was empty or whitespace-only.
    #[error("Query must not be empty")]
    EmptyQuery,

    /// A question arrived before any document was indexed.
    #[error("No documents have been indexed yet")]
    NotIndexed,

    /// An error in the indexing pipeline orchestration.
    #[error("Pipeline error: {0}")]
    PipelineError(String),
}

/// A convenience result type for askpdf operations.
pub type Result<T> = std::result::Result<T, RagError>;
