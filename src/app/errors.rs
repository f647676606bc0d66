use crate::{
    cache::CacheError, catalog::CatalogError, config::ConfigError, semantic::EmbeddingError,
};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Validation(String),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("catalog error: {0}")]
    Cache(#[from] CacheError),
}

impl AppError {
    /// True when the raw dataset file is absent.
    pub fn is_data_missing(&self) -> bool {
        matches!(
            self,
            AppError::Cache(CacheError::Catalog(CatalogError::DataMissing(_)))
        )
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        AppError::Cache(err.into())
    }
}
