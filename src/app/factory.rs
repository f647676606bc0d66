use crate::{
    app::App,
    cache::CatalogCache,
    catalog::CatalogProcessor,
    config::Config,
    fetch::{ContentFetcher, ReaderFetcher},
    http,
    semantic::{Embedder, HttpEmbedder, SearchEngine},
};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

/// Application factory for creating and wiring application components
pub struct AppFactory;

impl AppFactory {
    /// Load configuration from `config_path` (or the default locations)
    pub fn create_config(config_path: Option<&Path>) -> Result<Config> {
        Config::load(config_path).context("Failed to load configuration")
    }

    /// Create the application with the HTTP backed fetcher and embedder.
    ///
    /// A missing credential does not fail here; requests that need it do.
    pub fn create_app(config: Config) -> Result<App> {
        if config.api_key.is_none() {
            log::warn!("JINA_API_KEY is missing, searches will be rejected");
        }

        let client = http::build_client(&config).context("Failed to build HTTP client")?;
        let api_key = config.api_key.clone().unwrap_or_default();

        let fetcher: Arc<dyn ContentFetcher> = Arc::new(ReaderFetcher::new(
            client.clone(),
            &config.reader_url,
            &api_key,
        ));
        let embedder: Arc<dyn Embedder> = Arc::new(HttpEmbedder::new(
            client,
            &config.embeddings_url,
            &api_key,
            &config.embedding_model,
            config.max_input_chars,
        ));

        Ok(Self::create_app_with(config, fetcher, embedder))
    }

    /// Create the application around the given fetcher and embedder
    pub fn create_app_with(
        config: Config,
        fetcher: Arc<dyn ContentFetcher>,
        embedder: Arc<dyn Embedder>,
    ) -> App {
        let processor = CatalogProcessor::new(fetcher, embedder.clone(), config.batch_size);
        let cache = Arc::new(CatalogCache::new(
            processor,
            config.dataset_path(),
            config.cache_path(),
        ));
        let engine = SearchEngine::new(embedder, config.top_k);

        App::new(Arc::new(config), cache, engine)
    }
}
