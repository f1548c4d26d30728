//! Tests for sentence-aware text splitting and document chunking.

use std::collections::HashMap;

use askpdf_core::chunking::{Chunker, SentenceChunker, split_text};
use askpdf_core::document::{Document, Page};

fn make_document(id: &str, pages: &[&str]) -> Document {
    Document {
        id: id.to_string(),
        pages: pages
            .iter()
            .enumerate()
            .map(|(i, text)| Page { label: (i + 1).to_string(), text: (*text).to_string() })
            .collect(),
        metadata: HashMap::from([("source".to_string(), id.to_string())]),
        source_path: None,
    }
}

#[test]
fn short_text_is_a_single_chunk() {
    let chunks = split_text("Hello world", 1024, 20);
    assert_eq!(chunks, vec!["Hello world".to_string()]);
}

#[test]
fn whitespace_only_text_produces_no_chunks() {
    assert!(split_text("", 1024, 20).is_empty());
    assert!(split_text("   \n\t  ", 1024, 20).is_empty());
}

#[test]
fn chunks_never_exceed_max_size() {
    let text = "word ".repeat(500);
    let chunks = split_text(&text, 100, 20);

    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(chunk.len() <= 100, "chunk of {} bytes exceeds max", chunk.len());
    }
}

#[test]
fn splitting_prefers_sentence_boundaries() {
    let text = "The quick brown fox jumps over the dog. ".repeat(20);
    let chunks = split_text(&text, 100, 20);

    assert!(chunks.len() > 1);
    // Every chunk except possibly the last ends at a sentence boundary.
    for chunk in &chunks[..chunks.len() - 1] {
        assert!(
            chunk.ends_with('.') || chunk.ends_with('!') || chunk.ends_with('?'),
            "chunk does not end at a sentence boundary: {chunk:?}"
        );
    }
}

#[test]
fn consecutive_chunks_share_overlapping_text() {
    let text = "This is a test sentence. ".repeat(40);
    let chunks = split_text(&text, 200, 50);

    assert!(chunks.len() > 1);
    for window in chunks.windows(2) {
        let tail_start = window[0].len().saturating_sub(50);
        let tail = window[0][tail_start..].trim();
        // The next chunk re-covers the end of the previous one.
        let probe = &tail[..tail.len().min(20)];
        assert!(
            window[1].contains(probe),
            "no overlap between {:?} and {:?}",
            window[0],
            window[1]
        );
    }
}

#[test]
fn full_size_chunks_share_exactly_the_overlap_region() {
    // A non-repeating pattern with no break characters forces hard cuts
    // at max_size, where the overlap must be byte-exact.
    let text = "0123456789ABCDEF".repeat(22);
    let chunks = split_text(&text, 100, 20);

    assert!(chunks.len() > 2);
    for window in chunks.windows(2) {
        if window[0].len() == 100 && window[1].len() == 100 {
            assert_eq!(&window[0][80..], &window[1][..20]);
        }
    }
}

#[test]
fn splitting_is_deterministic() {
    let text = "Sentences to split over and over. ".repeat(30);
    let first = split_text(&text, 120, 30);
    let second = split_text(&text, 120, 30);

    assert!(first.len() > 1);
    assert_eq!(first, second);
}

#[test]
fn multibyte_text_splits_on_character_boundaries() {
    let text = "héllo wörld résumé ".repeat(30);
    let chunks = split_text(&text, 50, 10);

    assert!(!chunks.is_empty());
    for chunk in &chunks {
        assert!(chunk.len() <= 50);
        assert!(!chunk.is_empty());
    }
}

#[test]
fn cjk_text_without_spaces_does_not_panic() {
    let text = "中文测试文本没有空格也没有句点".repeat(20);
    let chunks = split_text(&text, 32, 8);

    assert!(!chunks.is_empty());
    for chunk in &chunks {
        assert!(chunk.len() <= 32);
    }
}

#[test]
fn overlap_larger_than_window_still_terminates() {
    let text = "a".repeat(50);
    let chunks = split_text(&text, 10, 20);

    assert_eq!(chunks.len(), 5);
    for chunk in &chunks {
        assert_eq!(chunk.len(), 10);
    }
}

#[test]
fn max_size_smaller_than_one_character_takes_it_whole() {
    // Each CJK character is three bytes, wider than the two-byte window.
    let chunks = split_text("字字字", 2, 0);
    assert_eq!(chunks, vec!["字".to_string(), "字".to_string(), "字".to_string()]);
}

#[test]
fn overlap_rewind_onto_a_character_boundary_still_advances() {
    // Four-byte characters with the rewind landing mid-character, where
    // boundary snapping would otherwise walk back to the previous start.
    let text = "𝄞".repeat(3);
    let chunks = split_text(&text, 5, 3);

    assert_eq!(chunks, vec!["𝄞".to_string(), "𝄞".to_string(), "𝄞".to_string()]);
}

#[test]
fn chunker_labels_chunks_with_page_and_index() {
    let chunker = SentenceChunker::new(1024, 20);
    let document = make_document("report.pdf", &["First page text.", "Second page text."]);

    let chunks = chunker.chunk(&document);

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].id, "report.pdf:1:0");
    assert_eq!(chunks[1].id, "report.pdf:2:1");
    assert_eq!(chunks[0].metadata["page_label"], "1");
    assert_eq!(chunks[1].metadata["page_label"], "2");
    assert_eq!(chunks[0].metadata["chunk_index"], "0");
    assert_eq!(chunks[1].metadata["chunk_index"], "1");
    // Document metadata is inherited.
    assert_eq!(chunks[0].metadata["source"], "report.pdf");
    assert_eq!(chunks[0].document_id, "report.pdf");
    assert!(chunks[0].embedding.is_empty());
}

#[test]
fn chunker_skips_pages_without_text() {
    let chunker = SentenceChunker::new(1024, 20);
    let document = make_document("doc.pdf", &["", "Only this page has text.", "   "]);

    let chunks = chunker.chunk(&document);

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].metadata["page_label"], "2");
    assert_eq!(chunks[0].text, "Only this page has text.");
}

#[test]
fn empty_document_produces_no_chunks() {
    let chunker = SentenceChunker::new(1024, 20);
    let document = make_document("empty.pdf", &[]);

    assert!(chunker.chunk(&document).is_empty());
}

#[test]
fn long_page_produces_multiple_chunks_with_increasing_index() {
    let chunker = SentenceChunker::new(100, 20);
    let long_page = "A sentence that fills some space. ".repeat(20);
    let document = make_document("long.pdf", &[&long_page]);

    let chunks = chunker.chunk(&document);

    assert!(chunks.len() > 1);
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.metadata["chunk_index"], i.to_string());
        assert_eq!(chunk.metadata["page_label"], "1");
    }
}
