pub mod errors;
pub mod factory;

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

pub use errors::AppError;
pub use factory::AppFactory;

use crate::{
    cache::{CacheState, CatalogCache},
    catalog::{Catalog, ScoredEntry},
    config::Config,
    semantic::SearchEngine,
};

#[derive(Debug, Clone, Serialize)]
pub struct CatalogStatus {
    pub state: CacheState,
    pub entries: Option<usize>,
    pub dimensions: Option<usize>,
    pub model: String,
    pub cache_path: PathBuf,
}

/// Request-level entry point shared by the web server and the CLI.
pub struct App {
    config: Arc<Config>,
    cache: Arc<CatalogCache>,
    engine: SearchEngine,
}

impl App {
    pub fn new(config: Arc<Config>, cache: Arc<CatalogCache>, engine: SearchEngine) -> Self {
        Self {
            config,
            cache,
            engine,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Search the catalog for `query`.
    ///
    /// The credential and the query are checked before any outbound call.
    pub async fn search(&self, query: Option<&str>) -> Result<Vec<ScoredEntry>, AppError> {
        self.config.api_key()?;

        let query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| AppError::Validation("Query parameter is required".to_string()))?;

        let catalog = self.cache.get_or_build().await?;
        let results = self.engine.search(query, &catalog).await?;

        Ok(results)
    }

    /// Resolve the catalog, optionally discarding the cache file first.
    pub async fn build(&self, force: bool) -> Result<Arc<Catalog>, AppError> {
        self.config.api_key()?;

        if force {
            self.cache.invalidate()?;
        }

        Ok(self.cache.get_or_build().await?)
    }

    pub fn status(&self) -> CatalogStatus {
        let catalog = self.cache.get();
        CatalogStatus {
            state: self.cache.state(),
            entries: catalog.as_ref().map(|c| c.len()),
            dimensions: catalog.as_ref().map(|c| c.dimensions()),
            model: self.cache.model().to_string(),
            cache_path: self.cache.cache_path().to_path_buf(),
        }
    }
}
