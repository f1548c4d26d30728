//! PDF discovery and text extraction.
//!
//! Discovery walks a single directory (no recursion) for `.pdf` files;
//! extraction pulls text out page by page so chunks can cite the page
//! they came from.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::document::{Document, Page};
use crate::error::{RagError, Result};

/// Find the PDF files to index in `dir`, sorted by path.
///
/// The `.pdf` extension match is case-insensitive. When the directory
/// does not exist it is created, so the user has an obvious place to put
/// documents, and reported as empty via [`RagError::NoDocuments`] with
/// `created: true`.
pub async fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            RagError::PipelineError(format!("failed to create {}: {e}", dir.display()))
        })?;
        info!(dir = %dir.display(), "created document directory");
        return Err(RagError::NoDocuments { dir: dir.to_path_buf(), created: true });
    }

    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        RagError::PipelineError(format!("failed to read {}: {e}", dir.display()))
    })?;

    let mut pdfs = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| {
        RagError::PipelineError(format!("failed to read {}: {e}", dir.display()))
    })? {
        let path = entry.path();
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        if is_file && path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("pdf")) {
            pdfs.push(path);
        }
    }

    if pdfs.is_empty() {
        return Err(RagError::NoDocuments { dir: dir.to_path_buf(), created: false });
    }

    pdfs.sort();
    Ok(pdfs)
}

/// Load one PDF into a [`Document`] with one [`Page`] per PDF page.
///
/// The document ID is the file name, and the `source` metadata field is
/// set to it. Pages are labelled `1`, `2`, ... the way a PDF reader
/// numbers them.
pub async fn load_document(path: &Path) -> Result<Document> {
    let source_file = path.display().to_string();
    let bytes = tokio::fs::read(path).await.map_err(|e| RagError::ExtractionError {
        source_file: source_file.clone(),
        message: format!("failed to read file: {e}"),
    })?;

    // pdf-extract is CPU-bound and synchronous; keep it off the async runtime.
    let page_texts =
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem_by_pages(&bytes))
            .await
            .map_err(|e| RagError::ExtractionError {
                source_file: source_file.clone(),
                message: format!("extraction task failed: {e}"),
            })?
            .map_err(|e| RagError::ExtractionError {
                source_file: source_file.clone(),
                message: format!("failed to extract text: {e}"),
            })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_file.clone());

    let pages: Vec<Page> = page_texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| Page { label: (i + 1).to_string(), text })
        .collect();

    let mut metadata = HashMap::new();
    metadata.insert("source".to_string(), file_name.clone());

    debug!(file = %file_name, pages = pages.len(), "extracted document");

    Ok(Document { id: file_name, pages, metadata, source_path: Some(source_file) })
}
