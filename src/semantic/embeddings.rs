//! Embedding client for a remote embedding service.
//!
//! Provides a high-level interface for generating embeddings:
//! - Input truncation to the service's length limit
//! - Single-element batch requests with bearer authentication
//! - Typed response schema; malformed responses become `EmbeddingError`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error type for embedding operations
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("Embedding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Embedding service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Invalid embedding response: {0}")]
    InvalidResponse(String),

    #[error("Embedding service returned an empty vector")]
    EmptyEmbedding,
}

/// Turns text into a fixed-length vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Model identifier; vectors from different models are not comparable.
    fn model(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Client for a Jina/OpenAI compatible `/v1/embeddings` endpoint.
pub struct HttpEmbedder {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model_name: String,
    max_input_chars: usize,
}

impl HttpEmbedder {
    pub fn new(
        client: reqwest::Client,
        endpoint: &str,
        api_key: &str,
        model_name: &str,
        max_input_chars: usize,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            model_name: model_name.to_string(),
            max_input_chars,
        }
    }
}

/// Cut `text` to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let input = truncate_chars(text, self.max_input_chars);

        let request = EmbeddingRequest {
            model: &self.model_name,
            input: [input],
        };

        log::debug!(
            "embedding request model={} chars={}",
            self.model_name,
            input.chars().count()
        );

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            log::error!("embedding service error response: {body}");
            return Err(EmbeddingError::Status { status, body });
        }

        let parsed: EmbeddingResponse = serde_json::from_str(&body).map_err(|err| {
            log::error!("unexpected embedding response structure: {body}");
            EmbeddingError::InvalidResponse(err.to_string())
        })?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbeddingError::InvalidResponse("empty data array".to_string()))?;

        if embedding.is_empty() {
            return Err(EmbeddingError::EmptyEmbedding);
        }

        Ok(embedding)
    }

    fn model(&self) -> &str {
        &self.model_name
    }
}
