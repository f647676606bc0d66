//! Builds the enriched catalog: fetch content, then embed, for every entry.
//!
//! Entries are processed in fixed-size batches. All entries of a batch are
//! in flight together; the next batch starts once the previous one is done.
//! A failed embedding drops that entry only.

use std::sync::Arc;

use futures::future::join_all;

use crate::catalog::{CatalogEntry, EnrichedEntry};
use crate::fetch::ContentFetcher;
use crate::semantic::Embedder;

/// Default number of entries in flight at once
pub const DEFAULT_BATCH_SIZE: usize = 50;

pub struct CatalogProcessor {
    fetcher: Arc<dyn ContentFetcher>,
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
}

impl CatalogProcessor {
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        embedder: Arc<dyn Embedder>,
        batch_size: usize,
    ) -> Self {
        Self {
            fetcher,
            embedder,
            batch_size: batch_size.max(1),
        }
    }

    pub fn model(&self) -> &str {
        self.embedder.model()
    }

    /// Enrich every entry, dropping the ones that could not be embedded.
    ///
    /// Output keeps input order. Entries whose embedding length differs from
    /// the first surviving entry are dropped as well.
    pub async fn build_catalog(&self, entries: &[CatalogEntry]) -> Vec<EnrichedEntry> {
        let mut enriched: Vec<EnrichedEntry> = Vec::with_capacity(entries.len());
        let total_batches = entries.len().div_ceil(self.batch_size);

        for (batch_idx, batch) in entries.chunks(self.batch_size).enumerate() {
            let results = join_all(batch.iter().map(|entry| self.enrich(entry))).await;

            let before = enriched.len();
            enriched.extend(results.into_iter().flatten());

            log::info!(
                "batch {}/{}: {} of {} entries embedded",
                batch_idx + 1,
                total_batches,
                enriched.len() - before,
                batch.len()
            );
        }

        let dimensions = enriched.first().map(|e| e.embedding.len());
        if let Some(dimensions) = dimensions {
            enriched.retain(|e| {
                let keep = e.embedding.len() == dimensions;
                if !keep {
                    log::warn!(
                        "dropping {:?}: embedding has {} dimensions, expected {dimensions}",
                        e.entry.title,
                        e.embedding.len()
                    );
                }
                keep
            });
        }

        log::info!(
            "catalog built: {} of {} entries enriched",
            enriched.len(),
            entries.len()
        );

        enriched
    }

    async fn enrich(&self, entry: &CatalogEntry) -> Option<EnrichedEntry> {
        log::info!("processing movie: {}", entry.title);

        let content = self.fetcher.fetch(&entry.source_ref).await;
        if content.is_empty() {
            log::debug!("no content for {:?}, embedding title only", entry.title);
        }

        let text = format!("{}. {}", entry.title, content);

        match self.embedder.embed(&text).await {
            Ok(embedding) if !embedding.is_empty() => Some(EnrichedEntry {
                entry: entry.clone(),
                embedding,
            }),
            Ok(_) => {
                log::error!("stage=embed title={:?} err=empty embedding", entry.title);
                None
            }
            Err(err) => {
                log::error!("stage=embed title={:?} err={err}", entry.title);
                None
            }
        }
    }
}
