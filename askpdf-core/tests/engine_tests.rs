//! Tests for the question-answering engine.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use askpdf_core::config::{EmbeddingFailurePolicy, RagConfig};
use askpdf_core::document::{Chunk, SearchResult};
use askpdf_core::embedding::{Embedder, EmbeddingAdapter, EmbeddingPurpose};
use askpdf_core::engine::{QueryEngine, grounding_prompt};
use askpdf_core::error::{RagError, Result};
use askpdf_core::generation::TextGenerator;
use askpdf_core::index::VectorIndex;
use askpdf_core::inmemory::InMemoryIndex;

const DIMS: usize = 3;

/// Maps keywords to fixed directions so retrieval order is predictable,
/// and records every call.
struct KeywordEmbedder {
    calls: AtomicUsize,
    purposes: std::sync::Mutex<Vec<EmbeddingPurpose>>,
}

impl KeywordEmbedder {
    fn new() -> Self {
        Self { calls: AtomicUsize::new(0), purposes: std::sync::Mutex::new(Vec::new()) }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn vector_for(text: &str) -> Vec<f32> {
    if text.contains("alpha") {
        vec![1.0, 0.0, 0.0]
    } else if text.contains("beta") {
        vec![0.0, 1.0, 0.0]
    } else {
        vec![0.0, 0.0, 1.0]
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str, purpose: EmbeddingPurpose) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.purposes.lock().unwrap().push(purpose);
        Ok(vector_for(text))
    }

    fn dimensions(&self) -> usize {
        DIMS
    }

    fn name(&self) -> &str {
        "Keyword"
    }
}

/// Returns the prompt it was given, so tests can inspect prompt assembly.
struct EchoGenerator;

#[async_trait]
impl TextGenerator for EchoGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        Ok(prompt.to_string())
    }

    fn name(&self) -> &str {
        "Echo"
    }
}

struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(RagError::GenerationError {
            provider: "Failing".to_string(),
            message: "simulated outage".to_string(),
        })
    }

    fn name(&self) -> &str {
        "Failing"
    }
}

/// Always fails, so only an adapter fallback can keep the query alive.
struct OutageEmbedder;

#[async_trait]
impl Embedder for OutageEmbedder {
    async fn embed(&self, _text: &str, _purpose: EmbeddingPurpose) -> Result<Vec<f32>> {
        Err(RagError::EmbeddingError {
            provider: "Outage".to_string(),
            message: "simulated outage".to_string(),
        })
    }

    fn dimensions(&self) -> usize {
        DIMS
    }

    fn name(&self) -> &str {
        "Outage"
    }
}

/// Returns a fixed answer and counts invocations.
struct CountingGenerator {
    calls: AtomicUsize,
}

impl CountingGenerator {
    fn new() -> Self {
        Self { calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl TextGenerator for CountingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("generated answer".to_string())
    }

    fn name(&self) -> &str {
        "Counting"
    }
}

fn make_chunk(id: &str, text: &str) -> Chunk {
    Chunk {
        id: id.to_string(),
        text: text.to_string(),
        embedding: vector_for(text),
        metadata: HashMap::new(),
        document_id: "doc.pdf".to_string(),
    }
}

async fn engine_over(
    chunks: &[Chunk],
    embedder: Arc<KeywordEmbedder>,
    generator: Arc<dyn TextGenerator>,
) -> QueryEngine {
    let index = Arc::new(InMemoryIndex::new(DIMS));
    if !chunks.is_empty() {
        index.upsert(chunks).await.unwrap();
    }
    QueryEngine::builder()
        .config(RagConfig::default())
        .embedder(embedder)
        .index(index)
        .generator(generator)
        .build()
        .unwrap()
}

#[tokio::test]
async fn empty_question_is_rejected_without_embedding() {
    let embedder = Arc::new(KeywordEmbedder::new());
    let engine =
        engine_over(&[make_chunk("a", "alpha facts")], embedder.clone(), Arc::new(EchoGenerator))
            .await;

    for query in ["", "   ", "\t\n"] {
        let err = engine.answer(query).await.unwrap_err();
        assert!(matches!(err, RagError::EmptyQuery), "query {query:?}");
    }
    assert_eq!(embedder.call_count(), 0);
}

#[tokio::test]
async fn unindexed_engine_refuses_before_embedding() {
    let embedder = Arc::new(KeywordEmbedder::new());
    let engine = engine_over(&[], embedder.clone(), Arc::new(EchoGenerator)).await;

    let err = engine.answer("a perfectly good question").await.unwrap_err();

    assert!(matches!(err, RagError::NotIndexed));
    assert_eq!(embedder.call_count(), 0);
}

#[tokio::test]
async fn answer_grounds_the_question_in_retrieved_text() {
    let embedder = Arc::new(KeywordEmbedder::new());
    let engine = engine_over(
        &[make_chunk("a", "alpha is the first letter")],
        embedder.clone(),
        Arc::new(EchoGenerator),
    )
    .await;

    let prompt = engine.answer("what is alpha?").await.unwrap();

    assert!(prompt.starts_with("Based on the following information from the document:\n\n"));
    assert!(prompt.contains("alpha is the first letter"));
    assert!(prompt.contains("Please answer this question: what is alpha?"));
    assert!(
        prompt.ends_with("If the answer cannot be found in the provided information, please say so.")
    );
    assert_eq!(embedder.call_count(), 1);
}

#[tokio::test]
async fn context_is_limited_to_top_k_chunks() {
    let chunks = vec![
        make_chunk("a1", "alpha one"),
        make_chunk("a2", "alpha two"),
        make_chunk("a3", "alpha three"),
        make_chunk("b1", "beta one"),
        make_chunk("g1", "gamma one"),
    ];
    let embedder = Arc::new(KeywordEmbedder::new());
    let engine = engine_over(&chunks, embedder, Arc::new(EchoGenerator)).await;

    // Default top_k is 3; the three alpha chunks all score 1.0 against
    // an alpha question while beta and gamma score 0.0.
    let prompt = engine.answer("tell me about alpha").await.unwrap();

    assert!(prompt.contains("alpha one"));
    assert!(prompt.contains("alpha two"));
    assert!(prompt.contains("alpha three"));
    assert!(!prompt.contains("beta one"));
    assert!(!prompt.contains("gamma one"));
}

#[tokio::test]
async fn question_is_trimmed_before_use() {
    let embedder = Arc::new(KeywordEmbedder::new());
    let engine =
        engine_over(&[make_chunk("a", "alpha facts")], embedder, Arc::new(EchoGenerator)).await;

    let prompt = engine.answer("  what is alpha?  \n").await.unwrap();

    assert!(prompt.contains("Please answer this question: what is alpha?\n"));
}

#[tokio::test]
async fn query_embedding_uses_query_purpose() {
    let embedder = Arc::new(KeywordEmbedder::new());
    let engine =
        engine_over(&[make_chunk("a", "alpha facts")], embedder.clone(), Arc::new(EchoGenerator))
            .await;

    engine.answer("alpha?").await.unwrap();

    let purposes = embedder.purposes.lock().unwrap();
    assert_eq!(purposes.as_slice(), &[EmbeddingPurpose::Query]);
}

#[tokio::test]
async fn generation_failure_surfaces_to_the_caller() {
    let embedder = Arc::new(KeywordEmbedder::new());
    let engine =
        engine_over(&[make_chunk("a", "alpha facts")], embedder, Arc::new(FailingGenerator)).await;

    let err = engine.answer("alpha?").await.unwrap_err();

    assert!(matches!(err, RagError::GenerationError { .. }));
}

#[tokio::test]
async fn query_embedding_outage_under_lenient_policy_still_answers() {
    let index = Arc::new(InMemoryIndex::new(DIMS));
    index
        .upsert(&[make_chunk("a", "alpha facts"), make_chunk("b", "beta facts")])
        .await
        .unwrap();

    let adapter = Arc::new(EmbeddingAdapter::new(
        Box::new(OutageEmbedder),
        EmbeddingFailurePolicy::ZeroVector,
    ));
    let generator = Arc::new(CountingGenerator::new());
    let engine = QueryEngine::builder()
        .config(RagConfig::default())
        .embedder(adapter)
        .index(index)
        .generator(generator.clone())
        .build()
        .unwrap();

    // The failed query embedding degrades to a zero vector; retrieval and
    // generation still run instead of surfacing the outage.
    let answer = engine.answer("what is alpha?").await.unwrap();

    assert_eq!(answer, "generated answer");
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn grounding_prompt_matches_expected_shape() {
    let results = vec![
        SearchResult { chunk: make_chunk("a", "first passage"), score: 0.9 },
        SearchResult { chunk: make_chunk("b", "second passage"), score: 0.5 },
    ];

    let prompt = grounding_prompt("where is it?", &results);

    assert_eq!(
        prompt,
        "Based on the following information from the document:\n\n\
         first passage\n\nsecond passage\n\n\
         Please answer this question: where is it?\n\n\
         If the answer cannot be found in the provided information, please say so."
    );
}
