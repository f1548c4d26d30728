//! askpdf: answer questions about the PDFs in a local directory.
//!
//! On startup the binary indexes every PDF under the document directory
//! into an in-memory vector index, then drops into an interactive loop
//! where each question is answered from the most relevant chunks.

mod output;
mod repl;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use askpdf_core::{
    Embedder, EmbeddingAdapter, EmbeddingFailurePolicy, EmbeddingPurpose, GeminiClient,
    GeminiEmbedder, GeminiGenerator, InMemoryIndex, IndexingPipeline, QueryEngine, RagConfig,
    RagError, SentenceChunker, TextGenerator,
};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Ask questions about the PDF documents in a local directory.
#[derive(Parser)]
#[command(name = "askpdf", version, about)]
struct Cli {
    /// Directory holding the PDF documents to index.
    #[arg(long, default_value = "./Document")]
    dir: PathBuf,

    /// Fail indexing when an embedding request fails, instead of storing
    /// a zero vector and carrying on.
    #[arg(long)]
    strict_embeddings: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Verify the API key against both Gemini models, then exit.
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up GOOGLE_API_KEY from a .env file if one is present.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "askpdf=info,askpdf_core=info".into()),
        )
        .init();

    let cli = Cli::parse();
    info!(dir = %cli.dir.display(), "starting askpdf");

    let client = match GeminiClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            output::error(&format!("Error: {e}"));
            output::info("Please set the GOOGLE_API_KEY environment variable.");
            output::info("You can create a .env file with your API key or run:");
            output::code("export GOOGLE_API_KEY=your_api_key");
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Command::Check) => check(client).await,
        None => run_chat(cli, client).await,
    }
}

/// Index the document directory and hand off to the question loop.
async fn run_chat(cli: Cli, client: GeminiClient) -> Result<()> {
    output::banner();

    let policy = if cli.strict_embeddings {
        EmbeddingFailurePolicy::Propagate
    } else {
        EmbeddingFailurePolicy::ZeroVector
    };
    let config = RagConfig::builder().on_embedding_failure(policy).build()?;

    let embedder: Arc<EmbeddingAdapter> = Arc::new(EmbeddingAdapter::new(
        Box::new(GeminiEmbedder::new(client.clone())),
        config.on_embedding_failure,
    ));
    let index = Arc::new(InMemoryIndex::new(embedder.dimensions()));
    let chunker = Arc::new(SentenceChunker::new(config.chunk_size, config.chunk_overlap));

    let pipeline = IndexingPipeline::builder()
        .config(config.clone())
        .embedder(embedder.clone())
        .index(index.clone())
        .chunker(chunker)
        .build()?;

    match pipeline.run(&cli.dir).await {
        Ok(report) => {
            output::success("\nDocuments loaded and indexed successfully!");
            if !report.failures.is_empty() {
                output::warning(&format!(
                    "{} document(s) could not be indexed:",
                    report.failures.len()
                ));
                for failure in &report.failures {
                    output::warning(&format!("  {}: {}", failure.source_file, failure.error));
                }
            }
            output::info("You can now ask questions about the content of your PDF documents.");
            output::info("Type 'help' for available commands or 'exit' to quit the application.");
        }
        Err(RagError::NoDocuments { dir, .. }) => {
            output::warning("No PDF files found in the Document directory.");
            output::info(
                "Please add PDF files to the Document directory and restart the application.",
            );
            output::info(&format!("Document directory: {}", dir.display()));
            std::process::exit(1);
        }
        Err(e) => {
            output::error(&format!("Error initializing the document index: {e}"));
            std::process::exit(1);
        }
    }

    let engine = QueryEngine::builder()
        .config(config)
        .embedder(embedder)
        .index(index)
        .generator(Arc::new(GeminiGenerator::new(client)))
        .build()?;

    repl::run(&engine).await
}

/// Exercise both Gemini models once with the configured key.
///
/// Both checks always run so one bad model does not mask the other;
/// the exit code is nonzero if either fails.
async fn check(client: GeminiClient) -> Result<()> {
    output::info("Testing Gemini API key and models...");
    let mut ok = true;

    let embedder = GeminiEmbedder::new(client.clone());
    output::info(&format!("\nTesting embedding model ({})...", embedder.model()));
    match embedder.embed("This is a test", EmbeddingPurpose::Document).await {
        Ok(embedding) => {
            output::success("Embedding model test successful!");
            output::info(&format!("Embedding dimension: {}", embedding.len()));
        }
        Err(e) => {
            output::error(&format!("Error testing embedding model: {e}"));
            ok = false;
        }
    }

    let generator = GeminiGenerator::new(client);
    output::info(&format!("\nTesting generative model ({})...", generator.model()));
    match generator.generate("Hello, how are you?").await {
        Ok(response) => {
            output::success("Generative model test successful!");
            let preview: String = response.chars().take(100).collect();
            output::info(&format!("Response: {preview}..."));
        }
        Err(e) => {
            output::error(&format!("Error testing generative model: {e}"));
            ok = false;
        }
    }

    output::info("\nTest complete!");
    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
