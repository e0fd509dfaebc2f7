//! Catalog search with configured defaults.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use shelf_catalog::{Book, Repository};
use shelf_search::{Ranker, SearchConfig};

#[derive(Debug, Clone)]
pub struct Searcher {
    repo: Repository,
    ranker: Ranker,
    limit: usize,
    min_score: f64,
}

impl Searcher {
    pub fn new(repo: Repository, config: &SearchConfig) -> Self {
        Self {
            repo,
            ranker: Ranker::new(config),
            limit: config.limit,
            min_score: config.min_score,
        }
    }

    /// Best matches for `query`, using the configured limit and threshold.
    pub async fn search(&self, query: &str) -> Result<Vec<Book>> {
        self.rank(query, self.limit, self.min_score).await
    }

    pub async fn rank(&self, query: &str, limit: usize, min_score: f64) -> Result<Vec<Book>> {
        self.ranker
            .rank(&self.repo, query, limit, min_score)
            .await
            .or_raise(|| ErrorKind::Search)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::catalog;

    async fn searcher() -> (shelf_catalog::Database, Searcher) {
        let (db, repo) = catalog().await;
        (db, Searcher::new(repo, &SearchConfig::default()))
    }

    #[tokio::test]
    async fn test_misspelled_title_finds_book() {
        let (_db, searcher) = searcher().await;
        let results = searcher.rank("hobit", 10, 60.0).await.unwrap();
        assert_eq!(results[0].title, "Hobbit");
        assert_eq!(results[0].author, "Tolkien");
    }

    #[tokio::test]
    async fn test_blank_query_is_empty() {
        let (_db, searcher) = searcher().await;
        assert!(searcher.search("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_is_repeatable() {
        let (_db, searcher) = searcher().await;
        let first = searcher.search("tolkien").await.unwrap();
        assert!(!first.is_empty());
        assert_eq!(searcher.search("tolkien").await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_higher_threshold_never_returns_more() {
        let (_db, searcher) = searcher().await;
        let mut previous = usize::MAX;
        for min_score in [0.0, 40.0, 60.0, 80.0, 100.0] {
            let count = searcher.rank("tolkien hobbit", 10, min_score).await.unwrap().len();
            assert!(count <= previous, "{min_score}: {count} > {previous}");
            previous = count;
        }
    }
}
