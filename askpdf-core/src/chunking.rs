//! Document chunking.
//!
//! Pages are split into overlapping windows of at most `chunk_size`
//! characters, preferring to break at sentence boundaries so chunks read
//! as coherent passages. Chunking is page-wise: a chunk never spans two
//! pages, and every chunk records the page it came from.

use crate::document::{Chunk, Document};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text and metadata but no embeddings.
/// Embeddings are attached later by the pipeline.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has no text.
    /// Each returned chunk has an empty embedding vector.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Splits page text at sentence boundaries into chunks of at most
/// `chunk_size` characters with `chunk_overlap` characters of overlap.
///
/// Chunk IDs are generated as `{document_id}:{page_label}:{chunk_index}`.
/// Each chunk inherits the parent document's metadata plus `page_label`
/// and `chunk_index` fields.
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl SentenceChunker {
    /// Create a new `SentenceChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — number of overlapping characters between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for SentenceChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut chunk_index = 0;

        for page in &document.pages {
            for text in split_text(&page.text, self.chunk_size, self.chunk_overlap) {
                let mut metadata = document.metadata.clone();
                metadata.insert("page_label".to_string(), page.label.clone());
                metadata.insert("chunk_index".to_string(), chunk_index.to_string());

                chunks.push(Chunk {
                    id: format!("{}:{}:{chunk_index}", document.id, page.label),
                    text,
                    embedding: Vec::new(),
                    metadata,
                    document_id: document.id.clone(),
                });
                chunk_index += 1;
            }
        }

        chunks
    }
}

/// Split text into overlapping windows of at most `max_size` bytes,
/// breaking at sentence boundaries where possible.
///
/// Whitespace-only input produces no chunks. Window edges are snapped to
/// UTF-8 character boundaries, so `max_size` is exact only for ASCII text.
pub fn split_text(text: &str, max_size: usize, overlap: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() || max_size == 0 {
        return Vec::new();
    }

    if text.len() <= max_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + max_size).min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        if end == start {
            // max_size is smaller than the next character; take it whole.
            end = start + 1;
            while !text.is_char_boundary(end) {
                end += 1;
            }
        }

        // Mid-text windows end at the best break point; the final window
        // takes everything that remains.
        let chunk_end = if end < text.len() {
            find_break_point(&text[start..end]).map(|offset| start + offset).unwrap_or(end)
        } else {
            end
        };

        let chunk_text = text[start..chunk_end].trim();
        if !chunk_text.is_empty() {
            chunks.push(chunk_text.to_string());
        }

        if chunk_end == text.len() {
            break;
        }

        let step = chunk_end - start;
        if step <= overlap {
            // Window shorter than the overlap: step past it to avoid looping.
            start = chunk_end;
        } else {
            let mut rewound = chunk_end - overlap;
            while !text.is_char_boundary(rewound) {
                rewound -= 1;
            }
            // Boundary snapping can rewind onto the previous start; progress
            // beats overlap in that case.
            start = if rewound > start { rewound } else { chunk_end };
        }
    }

    chunks
}

/// Find a good break point in a window (prefer paragraph, then sentence
/// boundaries). Returns the byte offset just past the boundary, or `None`
/// if no acceptable boundary exists.
fn find_break_point(window: &str) -> Option<usize> {
    let len = window.len();

    // Paragraph boundary.
    if let Some(pos) = window.rfind("\n\n") {
        if pos > len / 3 {
            return Some(pos + 2);
        }
    }

    // Sentence boundary.
    for pattern in &[". ", "! ", "? ", ".\n", "!\n", "?\n"] {
        if let Some(pos) = window.rfind(pattern) {
            if pos > len / 3 {
                return Some(pos + pattern.len());
            }
        }
    }

    // Any newline.
    if let Some(pos) = window.rfind('\n') {
        if pos > len / 3 {
            return Some(pos + 1);
        }
    }

    // Clause boundary.
    for pattern in &[", ", "; "] {
        if let Some(pos) = window.rfind(pattern) {
            if pos > len / 2 {
                return Some(pos + pattern.len());
            }
        }
    }

    // Word boundary.
    if let Some(pos) = window.rfind(' ') {
        return Some(pos + 1);
    }

    None
}
