pub mod reader;

use async_trait::async_trait;

pub use reader::ReaderFetcher;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("extraction service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Retrieves the plain-text content behind a catalog reference link.
///
/// `try_fetch` reports failures; `fetch` is the tolerant variant used while
/// building the catalog, where one bad source must not abort a batch.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn try_fetch(&self, url: &str) -> Result<String, FetchError>;

    /// Name of this fetcher for logging
    fn name(&self) -> &'static str;

    async fn fetch(&self, url: &str) -> String {
        match self.try_fetch(url).await {
            Ok(content) => content,
            Err(err) => {
                log::warn!("fetcher={} url={url} outcome=error err={err}", self.name());
                String::new()
            }
        }
    }
}
