//! Enriched catalog cache.
//!
//! Files:
//! - `processed_movies.json`: JSON array of enriched entries
//! - `processed_movies.meta.json`: model, dimensions, entry count, build time
//!
//! `CatalogCache` resolves the catalog once per process: memory first, then
//! the cache file, then a full build from the raw dataset. Concurrent first
//! callers share one in-flight build.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::catalog::{self, Catalog, CatalogError, CatalogProcessor, EnrichedEntry};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cache file {} is malformed: {source}", path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize catalog: {0}")]
    Serialize(serde_json::Error),

    #[error("no entries could be embedded out of {0}")]
    EmptyBuild(usize),
}

/// Lifecycle of the in-memory catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheState {
    Uninitialized,
    Loading,
    Ready,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheMeta {
    model: String,
    dimensions: usize,
    entries: usize,
    built_at: DateTime<Utc>,
}

/// Outcome of reading the cache file.
#[derive(Debug)]
pub enum CacheLoad {
    Loaded(Catalog),
    /// The file exists but must not be used; the reason is logged.
    Stale(String),
}

/// Reads and writes the cache file and its metadata sidecar.
pub struct CacheFile {
    path: PathBuf,
}

impl CacheFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn meta_path(&self) -> PathBuf {
        self.path.with_extension("meta.json")
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the catalog, checking it was built by `expected_model`.
    ///
    /// A file without sidecar is accepted as-is.
    pub fn load(&self, expected_model: &str) -> Result<CacheLoad, CacheError> {
        let meta_path = self.meta_path();
        if meta_path.exists() {
            match read_json::<CacheMeta>(&meta_path) {
                Ok(meta) if meta.model != expected_model => {
                    return Ok(CacheLoad::Stale(format!(
                        "built with model {:?}, configured model is {:?}",
                        meta.model, expected_model
                    )));
                }
                Ok(_) => {}
                Err(err) => log::warn!("ignoring unreadable cache metadata: {err}"),
            }
        }

        let entries: Vec<EnrichedEntry> = read_json(&self.path)?;

        match Catalog::from_entries(entries) {
            Ok(catalog) => Ok(CacheLoad::Loaded(catalog)),
            Err(err) => Ok(CacheLoad::Stale(err.to_string())),
        }
    }

    /// Persist the catalog, creating the parent directory if needed.
    ///
    /// Uses atomic write: temp file -> rename. Any previous file and sidecar
    /// are removed first, so a failed write never leaves a sidecar describing
    /// other data.
    pub fn save(&self, catalog: &Catalog, model: &str) -> Result<(), CacheError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| CacheError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        self.delete()?;

        let data = serde_json::to_vec(catalog.entries()).map_err(CacheError::Serialize)?;
        write_atomic(&self.path, &data)?;

        let meta = CacheMeta {
            model: model.to_string(),
            dimensions: catalog.dimensions(),
            entries: catalog.len(),
            built_at: Utc::now(),
        };
        let meta = serde_json::to_vec_pretty(&meta).map_err(CacheError::Serialize)?;
        write_atomic(&self.meta_path(), &meta)?;

        Ok(())
    }

    /// Delete the cache file and sidecar if they exist.
    pub fn delete(&self) -> Result<(), CacheError> {
        for path in [self.path.clone(), self.meta_path()] {
            if path.exists() {
                std::fs::remove_file(&path).map_err(|source| CacheError::Io { path, source })?;
            }
        }
        Ok(())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CacheError> {
    let data = std::fs::read(path).map_err(|source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&data).map_err(|source| CacheError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<(), CacheError> {
    let temp_path = path.with_extension("tmp");
    let io_err = |source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Err(err) = std::fs::write(&temp_path, data) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(io_err(err));
    }

    std::fs::rename(&temp_path, path).map_err(io_err)
}

/// Resets the loading flag even if the build future is dropped.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn new(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Process-lifetime holder of the enriched catalog.
pub struct CatalogCache {
    dataset_path: PathBuf,
    file: CacheFile,
    processor: CatalogProcessor,
    catalog: OnceCell<Arc<Catalog>>,
    loading: AtomicBool,
}

impl CatalogCache {
    pub fn new(processor: CatalogProcessor, dataset_path: PathBuf, cache_path: PathBuf) -> Self {
        Self {
            dataset_path,
            file: CacheFile::new(cache_path),
            processor,
            catalog: OnceCell::new(),
            loading: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> CacheState {
        if self.catalog.initialized() {
            CacheState::Ready
        } else if self.loading.load(Ordering::SeqCst) {
            CacheState::Loading
        } else {
            CacheState::Uninitialized
        }
    }

    /// The catalog if it has already been resolved.
    pub fn get(&self) -> Option<Arc<Catalog>> {
        self.catalog.get().cloned()
    }

    pub fn model(&self) -> &str {
        self.processor.model()
    }

    pub fn cache_path(&self) -> &Path {
        self.file.path()
    }

    /// Return the catalog, loading or building it on first use.
    ///
    /// A failed resolution leaves the cache uninitialized; the next call retries.
    pub async fn get_or_build(&self) -> Result<Arc<Catalog>, CacheError> {
        self.catalog
            .get_or_try_init(|| async {
                let _guard = LoadingGuard::new(&self.loading);
                self.load_or_build().await.map(Arc::new)
            })
            .await
            .cloned()
    }

    /// Remove the on-disk cache. The in-memory catalog, if any, is kept.
    pub fn invalidate(&self) -> Result<(), CacheError> {
        log::info!("removing cache file {}", self.file.path().display());
        self.file.delete()
    }

    async fn load_or_build(&self) -> Result<Catalog, CacheError> {
        let model = self.processor.model().to_string();

        if self.file.exists() {
            match self.file.load(&model)? {
                CacheLoad::Loaded(catalog) => {
                    log::info!(
                        "loaded {} entries from {}",
                        catalog.len(),
                        self.file.path().display()
                    );
                    return Ok(catalog);
                }
                CacheLoad::Stale(reason) => {
                    log::warn!("cache file is stale ({reason}), rebuilding");
                }
            }
        } else {
            log::info!("no cache file at {}, building catalog", self.file.path().display());
        }

        let entries = catalog::load_dataset(&self.dataset_path).map_err(|err| {
            log::error!("failed to load dataset: {err}");
            err
        })?;

        let enriched = self.processor.build_catalog(&entries).await;
        if enriched.is_empty() && !entries.is_empty() {
            log::error!("catalog build produced no entries, not caching");
            return Err(CacheError::EmptyBuild(entries.len()));
        }

        let catalog = Catalog::from_entries(enriched)?;
        self.file.save(&catalog, &model)?;

        log::info!(
            "saved {} entries to {}",
            catalog.len(),
            self.file.path().display()
        );

        Ok(catalog)
    }
}
