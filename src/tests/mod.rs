//! Shared test doubles and helpers.


use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::catalog::CatalogEntry;
use crate::fetch::{ContentFetcher, FetchError};
use crate::semantic::{Embedder, EmbeddingError};

/// Serve `router` on an ephemeral local port and return its base url.
pub async fn mock_server(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock server");
    let addr = listener.local_addr().expect("mock server has no address");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock server failed");
    });

    format!("http://{addr}")
}

/// `n` entries titled "Movie 1".."Movie n" linking to https://a.test/<i>.
pub fn catalog_entries(n: usize) -> Vec<CatalogEntry> {
    (1..=n)
        .map(|i| CatalogEntry {
            title: format!("Movie {i}"),
            source_ref: format!("https://a.test/{i}"),
        })
        .collect()
}

pub fn write_dataset(data_dir: &Path, entries: &[CatalogEntry]) {
    std::fs::create_dir_all(data_dir).unwrap();
    std::fs::write(
        data_dir.join("movies.json"),
        serde_json::to_vec(entries).unwrap(),
    )
    .unwrap();
}

/// Tracks concurrently running calls.
#[derive(Default)]
struct InFlight {
    current: AtomicUsize,
    max: AtomicUsize,
}

impl InFlight {
    async fn track<T>(&self, value: T) -> T {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        value
    }
}

#[derive(Default)]
pub struct MockFetcher {
    content: HashMap<String, String>,
    failing: HashSet<String>,
    calls: AtomicUsize,
    in_flight: InFlight,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(mut self, url: &str, content: &str) -> Self {
        self.content.insert(url.to_string(), content.to_string());
        self
    }

    pub fn failing_on(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.in_flight.max.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentFetcher for MockFetcher {
    async fn try_fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.in_flight.track(()).await;

        if self.failing.contains(url) {
            return Err(FetchError::Status {
                status: reqwest::StatusCode::BAD_GATEWAY,
                body: "mock failure".to_string(),
            });
        }

        Ok(self.content.get(url).cloned().unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "Mock"
    }
}

/// Embeds text into a deterministic 4-dimensional vector unless overridden.
pub struct MockEmbedder {
    model: String,
    vectors: HashMap<String, Vec<f32>>,
    failing: HashSet<String>,
    inputs: Mutex<Vec<String>>,
    in_flight: InFlight,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self::with_model("mock-model")
    }

    pub fn with_model(model: &str) -> Self {
        Self {
            model: model.to_string(),
            vectors: HashMap::new(),
            failing: HashSet::new(),
            inputs: Mutex::new(Vec::new()),
            in_flight: InFlight::default(),
        }
    }

    pub fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    pub fn failing_on(mut self, text: &str) -> Self {
        self.failing.insert(text.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.inputs.lock().unwrap().len()
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.in_flight.max.load(Ordering::SeqCst)
    }

    pub fn default_vector(text: &str) -> Vec<f32> {
        let bytes = text.as_bytes();
        let sum: u32 = bytes.iter().map(|&b| b as u32).sum();
        vec![
            bytes.len() as f32,
            (sum % 97) as f32,
            bytes.iter().filter(|&&b| b.is_ascii_digit()).count() as f32,
            1.0,
        ]
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.inputs.lock().unwrap().push(text.to_string());
        self.in_flight.track(()).await;

        if self.failing.contains(text) {
            return Err(EmbeddingError::Status {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                body: "mock failure".to_string(),
            });
        }

        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| Self::default_vector(text)))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Config rooted in `dir` with a test credential.
pub fn test_config(dir: &Path) -> crate::config::Config {
    crate::config::Config {
        data_dir: dir.join("data"),
        cache_dir: dir.join(".cache"),
        api_key: Some("test-key".to_string()),
        ..Default::default()
    }
}
