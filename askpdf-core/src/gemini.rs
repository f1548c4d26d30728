//! Gemini embedding and generation providers using the Gemini REST API.
//!
//! Both providers share a [`GeminiClient`] that installs the API key as a
//! default header, applies a request timeout, and retries once on
//! transient failures. Requests and responses are typed `serde` structs;
//! nothing downstream touches raw JSON.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::embedding::{Embedder, EmbeddingPurpose};
use crate::error::{RagError, Result};
use crate::generation::TextGenerator;

/// Base URL of the Gemini REST API.
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The default embedding model.
const DEFAULT_EMBEDDING_MODEL: &str = "models/text-embedding-004";

/// The dimensionality of `text-embedding-004` vectors.
const DEFAULT_DIMENSIONS: usize = 768;

/// The default generation model.
const DEFAULT_GENERATION_MODEL: &str = "models/gemini-2.5-flash";

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Pause before the single retry of a transient failure.
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Shared HTTP client for the Gemini REST API.
///
/// The API key is installed as the `x-goog-api-key` default header so
/// individual requests never carry credentials explicitly. Every request
/// has a 30-second timeout and is retried once after a short backoff when
/// the failure looks transient (connect or timeout errors, HTTP 408, 429,
/// or any 5xx).
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::ConfigError("Gemini API key must not be empty".to_string()));
        }

        let header = HeaderValue::from_str(&api_key)
            .map_err(|_| RagError::ConfigError("Gemini API key is not valid ASCII".to_string()))?;
        let headers = HeaderMap::from_iter([(HeaderName::from_static("x-goog-api-key"), header)]);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RagError::ConfigError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Create a client from the `GOOGLE_API_KEY` environment variable,
    /// falling back to `GEMINI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY")
            .or_else(|_| std::env::var("GEMINI_API_KEY"))
            .map_err(|_| {
                RagError::ConfigError(
                    "GOOGLE_API_KEY or GEMINI_API_KEY environment variable not set".to_string(),
                )
            })?;
        Self::new(api_key)
    }

    /// POST a JSON body to `{base}/{path}` and deserialize the JSON reply.
    ///
    /// Returns the failure as a message string; callers wrap it in the
    /// error variant of their own stage.
    async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> std::result::Result<Resp, String>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = format!("{GEMINI_BASE_URL}/{path}");
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.client.post(&url).json(body).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<Resp>()
                            .await
                            .map_err(|e| format!("failed to parse response: {e}"));
                    }

                    let transient = status == StatusCode::REQUEST_TIMEOUT
                        || status == StatusCode::TOO_MANY_REQUESTS
                        || status.is_server_error();
                    if transient && attempt == 1 {
                        warn!(%status, "transient API error, retrying");
                        tokio::time::sleep(RETRY_BACKOFF).await;
                        continue;
                    }

                    let body = response.text().await.unwrap_or_default();
                    let detail = serde_json::from_str::<ApiErrorResponse>(&body)
                        .map(|e| e.error.message)
                        .unwrap_or(body);
                    return Err(format!("API returned {status}: {detail}"));
                }
                Err(e) => {
                    if (e.is_timeout() || e.is_connect()) && attempt == 1 {
                        warn!(error = %e, "request failed, retrying");
                        tokio::time::sleep(RETRY_BACKOFF).await;
                        continue;
                    }
                    return Err(format!("request failed: {e}"));
                }
            }
        }
    }
}

/// The `taskType` string the embedding API expects for a purpose.
fn task_type(purpose: EmbeddingPurpose) -> &'static str {
    match purpose {
        EmbeddingPurpose::Document => "RETRIEVAL_DOCUMENT",
        EmbeddingPurpose::Query => "RETRIEVAL_QUERY",
    }
}

// ── Gemini API request/response types ──────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: &'a str,
    content: Content<'a>,
    task_type: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content.parts.iter().filter_map(|p| p.text.as_deref()).collect::<Vec<_>>().join("")
            })
            .unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// ── Embedding provider ─────────────────────────────────────────────

/// An [`Embedder`] backed by the Gemini embedding API.
///
/// Calls the `:embedContent` endpoint with the task type matching the
/// [`EmbeddingPurpose`], so document chunks and queries get embeddings
/// tuned for their side of the search.
///
/// # Configuration
///
/// - `model` – defaults to `models/text-embedding-004`.
/// - `dimensions` – defaults to 768, the fixed output size of that model.
pub struct GeminiEmbedder {
    client: GeminiClient,
    model: String,
    dimensions: usize,
}

impl GeminiEmbedder {
    /// Create a new embedder with the default model.
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: DEFAULT_DIMENSIONS,
        }
    }

    /// Set the embedding model (e.g. `models/gemini-embedding-001`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the expected embedding dimensionality.
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self
    }

    /// The model this embedder sends text to.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    async fn embed(&self, text: &str, purpose: EmbeddingPurpose) -> Result<Vec<f32>> {
        debug!(
            provider = "Gemini",
            model = %self.model,
            text_len = text.len(),
            task = task_type(purpose),
            "embedding text"
        );

        let request = EmbedContentRequest {
            model: &self.model,
            content: Content { parts: vec![Part { text }] },
            task_type: task_type(purpose),
        };

        let path = format!("{}:embedContent", self.model);
        let response: EmbedContentResponse =
            self.client.post_json(&path, &request).await.map_err(|message| {
                error!(provider = "Gemini", error = %message, "embedding request failed");
                RagError::EmbeddingError { provider: "Gemini".into(), message }
            })?;

        let values = response.embedding.values;
        if values.len() != self.dimensions {
            return Err(RagError::EmbeddingError {
                provider: "Gemini".into(),
                message: format!(
                    "API returned {} dimensions, expected {}",
                    values.len(),
                    self.dimensions
                ),
            });
        }
        Ok(values)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "Gemini"
    }
}

// ── Generation provider ────────────────────────────────────────────

/// A [`TextGenerator`] backed by the Gemini generation API.
///
/// Sends the prompt as a single user turn to the `:generateContent`
/// endpoint and returns the first candidate's text.
pub struct GeminiGenerator {
    client: GeminiClient,
    model: String,
}

impl GeminiGenerator {
    /// Create a new generator with the default model.
    pub fn new(client: GeminiClient) -> Self {
        Self { client, model: DEFAULT_GENERATION_MODEL.to_string() }
    }

    /// Set the generation model (e.g. `models/gemini-2.5-pro`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// The model this generator sends prompts to.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(
            provider = "Gemini",
            model = %self.model,
            prompt_len = prompt.len(),
            "generating answer"
        );

        let request = GenerateContentRequest {
            contents: vec![RequestContent { role: "user", parts: vec![Part { text: prompt }] }],
        };

        let path = format!("{}:generateContent", self.model);
        let response: GenerateContentResponse =
            self.client.post_json(&path, &request).await.map_err(|message| {
                error!(provider = "Gemini", error = %message, "generation request failed");
                RagError::GenerationError { provider: "Gemini".into(), message }
            })?;

        let text = response.text();
        if text.is_empty() {
            return Err(RagError::GenerationError {
                provider: "Gemini".into(),
                message: "API returned no candidate text".into(),
            });
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        "Gemini"
    }
}

// ── Wire format tests ──────────────────────────────────────────────
