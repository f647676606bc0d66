//! Query-to-catalog similarity search.

use std::sync::Arc;

use crate::catalog::{Catalog, EnrichedEntry, ScoredEntry};
use crate::semantic::embeddings::{Embedder, EmbeddingError};
use crate::semantic::similarity::cosine_similarity;

/// Default number of results per search
pub const DEFAULT_TOP_K: usize = 6;

pub struct SearchEngine {
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl SearchEngine {
    pub fn new(embedder: Arc<dyn Embedder>, top_k: usize) -> Self {
        Self { embedder, top_k }
    }

    /// Embed `query` and return the `top_k` closest catalog entries.
    ///
    /// There is no fallback ranking: if the query cannot be embedded the
    /// search fails.
    pub async fn search(
        &self,
        query: &str,
        catalog: &Catalog,
    ) -> Result<Vec<ScoredEntry>, EmbeddingError> {
        let query_embedding = self.embedder.embed(query).await.map_err(|err| {
            log::error!("failed to embed search query {query:?}: {err}");
            err
        })?;

        let results = rank(&query_embedding, catalog.entries(), self.top_k);

        log::info!(
            "query {query:?} scored against {} entries, top score {:?}",
            catalog.len(),
            results.first().map(|r| r.score)
        );

        Ok(results)
    }
}

/// Score every entry against `query`, sort descending and keep the first `limit`.
///
/// The sort is stable: entries with equal scores keep their catalog order.
pub fn rank(query: &[f32], entries: &[EnrichedEntry], limit: usize) -> Vec<ScoredEntry> {
    let mut results: Vec<ScoredEntry> = entries
        .iter()
        .map(|entry| ScoredEntry {
            score: cosine_similarity(query, &entry.embedding),
            entry: entry.clone(),
        })
        .collect();

    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(limit);

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;
    use crate::tests::MockEmbedder;

    fn entry(idx: usize, embedding: Vec<f32>) -> EnrichedEntry {
        EnrichedEntry {
            entry: CatalogEntry {
                title: format!("Movie {idx}"),
                source_ref: format!("https://a.test/{idx}"),
            },
            embedding,
        }
    }

    /// Ten distinct directions in 4 dimensions.
    fn ten_entries() -> Vec<EnrichedEntry> {
        (1..=10)
            .map(|i| {
                let x = i as f32;
                entry(i, vec![x, 10.0 - x, (x * 0.7).sin(), 1.0])
            })
            .collect()
    }

    fn assert_non_increasing(results: &[ScoredEntry]) {
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_exact_match_ranks_first() {
        let entries = ten_entries();
        let query_vec = entries[2].embedding.clone();
        let catalog = Catalog::from_entries(entries).unwrap();

        let embedder = Arc::new(MockEmbedder::new().with_vector("cozy", query_vec));
        let engine = SearchEngine::new(embedder.clone(), DEFAULT_TOP_K);

        let results = engine.search("cozy", &catalog).await.unwrap();

        assert_eq!(results[0].title(), "Movie 3");
        assert!((results[0].score - 1.0).abs() < 1e-5);
        assert_eq!(embedder.calls(), 1);
    }

    #[tokio::test]
    async fn test_returns_top_six_sorted() {
        let catalog = Catalog::from_entries(ten_entries()).unwrap();
        let embedder = Arc::new(MockEmbedder::new().with_vector("q", vec![1.0, 0.0, 0.0, 0.0]));
        let engine = SearchEngine::new(embedder, DEFAULT_TOP_K);

        let results = engine.search("q", &catalog).await.unwrap();

        assert_eq!(results.len(), 6);
        assert_non_increasing(&results);
    }

    #[tokio::test]
    async fn test_small_catalog_returns_all() {
        let entries: Vec<_> = ten_entries().into_iter().take(4).collect();
        let catalog = Catalog::from_entries(entries).unwrap();
        let embedder = Arc::new(MockEmbedder::new().with_vector("q", vec![0.0, 1.0, 0.0, 0.0]));
        let engine = SearchEngine::new(embedder, DEFAULT_TOP_K);

        let results = engine.search("q", &catalog).await.unwrap();

        assert_eq!(results.len(), 4);
        assert_non_increasing(&results);
        assert_eq!(results[0].title(), "Movie 1");
    }

    #[tokio::test]
    async fn test_does_not_mutate_catalog() {
        let catalog = Catalog::from_entries(ten_entries()).unwrap();
        let before = catalog.clone();
        let embedder = Arc::new(MockEmbedder::new().with_vector("q", vec![1.0, 1.0, 1.0, 1.0]));
        let engine = SearchEngine::new(embedder, DEFAULT_TOP_K);

        engine.search("q", &catalog).await.unwrap();

        assert_eq!(catalog, before);
    }

    #[tokio::test]
    async fn test_query_embedding_failure_aborts() {
        let catalog = Catalog::from_entries(ten_entries()).unwrap();
        let embedder = Arc::new(MockEmbedder::new().failing_on("q"));
        let engine = SearchEngine::new(embedder, DEFAULT_TOP_K);

        let result = engine.search("q", &catalog).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_rank_ties_keep_catalog_order() {
        let entries = vec![
            entry(1, vec![0.0, 1.0]),
            entry(2, vec![1.0, 0.0]),
            entry(3, vec![2.0, 0.0]),
            entry(4, vec![0.5, 0.0]),
        ];

        let results = rank(&[1.0, 0.0], &entries, 10);
        let titles: Vec<_> = results.iter().map(|r| r.title()).collect();

        assert_eq!(titles, vec!["Movie 2", "Movie 3", "Movie 4", "Movie 1"]);
    }

    #[test]
    fn test_rank_with_overflowing_entries() {
        let entries: Vec<_> = (1..=30)
            .map(|i| {
                if i % 3 == 0 {
                    entry(i, vec![2e19, 1.0])
                } else {
                    entry(i, vec![i as f32, 1.0])
                }
            })
            .collect();

        let results = rank(&[1.0, 0.0], &entries, 6);

        assert_eq!(results.len(), 6);
        assert!(results.iter().all(|r| r.score.is_finite()));
        assert_non_increasing(&results);
        assert_eq!(results[0].title(), "Movie 3");
    }

    #[test]
    fn test_rank_empty_catalog() {
        assert!(rank(&[1.0], &[], 6).is_empty());
    }
}
