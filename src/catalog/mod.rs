//! Catalog data model.
//!
//! - `CatalogEntry`: raw dataset item (title + reference link)
//! - `EnrichedEntry`: catalog entry with its content embedding
//! - `ScoredEntry`: enriched entry ranked against a query
//! - `Catalog`: validated collection of enriched entries
//! - `processor`: builds a catalog from raw entries

pub mod processor;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use processor::CatalogProcessor;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("movies data file not found at {}", .0.display())]
    DataMissing(PathBuf),

    #[error("io error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed json in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("entry {title:?} has an invalid embedding: {reason}")]
    InvalidEmbedding { title: String, reason: String },
}

/// One item of the static dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    /// Link to the page whose content describes the item
    #[serde(rename = "wikipedia_link", alias = "source_ref")]
    pub source_ref: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedEntry {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEntry {
    #[serde(flatten)]
    pub entry: EnrichedEntry,
    /// Cosine similarity to the query, in [-1, 1]
    pub score: f32,
}

impl ScoredEntry {
    pub fn title(&self) -> &str {
        &self.entry.entry.title
    }
}

/// Enriched entries sharing one non-zero embedding dimensionality.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: Vec<EnrichedEntry>,
    dimensions: usize,
}

impl Catalog {
    /// Build a catalog, rejecting empty or mixed-dimension embeddings.
    pub fn from_entries(entries: Vec<EnrichedEntry>) -> Result<Self, CatalogError> {
        let dimensions = entries.first().map(|e| e.embedding.len()).unwrap_or(0);

        for enriched in &entries {
            let got = enriched.embedding.len();
            if got == 0 {
                return Err(CatalogError::InvalidEmbedding {
                    title: enriched.entry.title.clone(),
                    reason: "empty embedding".to_string(),
                });
            }
            if got != dimensions {
                return Err(CatalogError::InvalidEmbedding {
                    title: enriched.entry.title.clone(),
                    reason: format!("expected {dimensions} dimensions, got {got}"),
                });
            }
        }

        Ok(Self {
            entries,
            dimensions,
        })
    }

    pub fn entries(&self) -> &[EnrichedEntry] {
        &self.entries
    }

    /// Embedding length shared by every entry; 0 for an empty catalog.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read the raw dataset. A missing file is `DataMissing`, not an I/O error.
pub fn load_dataset(path: &Path) -> Result<Vec<CatalogEntry>, CatalogError> {
    if !path.exists() {
        return Err(CatalogError::DataMissing(path.to_path_buf()));
    }

    let data = std::fs::read(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_slice(&data).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })
}
