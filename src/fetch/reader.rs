use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{ContentFetcher, FetchError};

#[derive(Debug, Default, Deserialize)]
struct ReaderResponse {
    data: Option<ReaderData>,
}

#[derive(Debug, Default, Deserialize)]
struct ReaderData {
    content: Option<String>,
}

/// Content extraction through a Jina Reader compatible endpoint.
pub struct ReaderFetcher {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl ReaderFetcher {
    pub fn new(client: reqwest::Client, endpoint: &str, api_key: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl ContentFetcher for ReaderFetcher {
    async fn try_fetch(&self, url: &str) -> Result<String, FetchError> {
        url::Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .bearer_auth(&self.api_key)
            .json(&json!({ "url": url }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let resp = resp.json::<ReaderResponse>().await?;
        let content = resp.data.and_then(|d| d.content).unwrap_or_default();

        log::debug!("fetched {} chars for {url}", content.chars().count());

        Ok(content)
    }

    fn name(&self) -> &'static str {
        "Reader"
    }
}
