//! Ranking: retrieve, score, filter, sort, truncate.

use crate::config::SearchConfig;
use crate::error::{ErrorKind, Result};
use crate::retrieve::{CandidateSource, Retrieval};
use crate::score::Scorer;
use exn::ResultExt;
use tracing::instrument;

/// A candidate and its score. Never leaves this module: callers only get the
/// ordered entries.
struct Scored<E> {
    entry: E,
    score: f64,
}

/// Runs the full search pipeline against a [`CandidateSource`].
#[derive(Debug, Clone)]
pub struct Ranker {
    scorer: Scorer,
    candidate_limit: usize,
}

impl Ranker {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            scorer: Scorer::new(config),
            // A zero batch would never finish paging.
            candidate_limit: config.candidate_limit.max(1),
        }
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    /// Returns at most `limit` entries scoring at least `min_score`, best
    /// first.
    ///
    /// - An empty (or whitespace-only) query returns nothing without touching
    ///   the source.
    /// - Every entry sharing a fragment with a query token is scored, however
    ///   large the catalog: candidates are pulled `candidate_limit` at a time
    ///   and only the best `limit` are kept between batches.
    /// - Equal scores keep the order the source returned them in.
    #[instrument(skip(self, source), fields(candidates = tracing::field::Empty))]
    pub async fn rank<S: CandidateSource>(
        &self,
        source: &S,
        query: &str,
        limit: usize,
        min_score: f64,
    ) -> Result<Vec<S::Entry>> {
        let Some(retrieval) = Retrieval::plan(self.scorer.tokenizer(), query) else {
            return Ok(Vec::new());
        };
        let prepared = self.scorer.prepare(query);
        let mut best: Vec<Scored<S::Entry>> = Vec::new();
        let mut offset = 0;
        loop {
            let batch = source
                .candidates(&retrieval, offset, self.candidate_limit)
                .await
                .or_raise(|| ErrorKind::Retrieval)?;
            let fetched = batch.len();
            offset += fetched;
            best.extend(
                batch
                    .into_iter()
                    .map(|entry| {
                        let score = prepared.score(&entry);
                        Scored { entry, score }
                    })
                    .filter(|candidate| candidate.score >= min_score),
            );
            // Stable: ties keep retrieval order, earlier batches first.
            best.sort_by(|a, b| b.score.total_cmp(&a.score));
            best.truncate(limit);
            if fetched < self.candidate_limit {
                break;
            }
        }
        tracing::Span::current().record("candidates", offset);
        tracing::debug!(matches = best.len(), best = best.first().map(|c| c.score), "ranked candidates");
        Ok(best.into_iter().map(|candidate| candidate.entry).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieve::Entry;
    use async_trait::async_trait;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct Book {
        title: &'static str,
        author: &'static str,
    }
    impl Entry for Book {
        fn title(&self) -> &str {
            self.title
        }
        fn author(&self) -> &str {
            self.author
        }
    }

    /// Counts how often the store is hit.
    struct CountingSource {
        books: Vec<Book>,
        calls: AtomicUsize,
    }
    impl CountingSource {
        fn new(books: &[(&'static str, &'static str)]) -> Self {
            Self {
                books: books.iter().map(|&(title, author)| Book { title, author }).collect(),
                calls: AtomicUsize::new(0),
            }
        }
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }
    #[async_trait]
    impl CandidateSource for CountingSource {
        type Entry = Book;
        async fn candidates(&self, retrieval: &Retrieval, offset: usize, limit: usize) -> Result<Vec<Book>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.books.candidates(retrieval, offset, limit).await
        }
    }

    fn ranker() -> Ranker {
        Ranker::new(&SearchConfig::default())
    }

    fn fantasy() -> CountingSource {
        CountingSource::new(&[
            ("Silmarillion", "Tolkien"),
            ("Hobbit", "Tolkien"),
            ("The Lord of the Rings", "Tolkien"),
            ("Dune", "Frank Herbert"),
        ])
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    #[tokio::test]
    async fn test_empty_query_skips_the_store(#[case] query: &str) {
        let source = fantasy();
        let found = ranker().rank(&source, query, 10, 0.0).await.unwrap();
        assert!(found.is_empty());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_misspelled_title_ranks_first() {
        let source = fantasy();
        let found = ranker().rank(&source, "hobit", 10, 60.0).await.unwrap();
        assert_eq!(found[0], Book { title: "Hobbit", author: "Tolkien" });
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_misspelled_token_is_scored_next_to_literal_matches() {
        let source = CountingSource::new(&[
            ("Hobbit", "Tolkien"),
            ("Grimm Fairy Tales", "Grimm"),
            ("Silmarillion", "Tolkien"),
        ]);
        let found = ranker().rank(&source, "silmarilion grimm", 10, 0.0).await.unwrap();
        let titles: Vec<_> = found.iter().map(|b| b.title).collect();
        assert!(titles.contains(&"Silmarillion"), "{titles:?}");
        assert!(titles.contains(&"Grimm Fairy Tales"), "{titles:?}");
    }

    #[tokio::test]
    async fn test_literal_match() {
        let source = fantasy();
        let found = ranker().rank(&source, "dune", 10, 60.0).await.unwrap();
        assert_eq!(found, vec![Book { title: "Dune", author: "Frank Herbert" }]);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_unrelated_query_finds_nothing() {
        let source = fantasy();
        let found = ranker().rank(&source, "Анна Каренина", 10, 60.0).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_empty_catalog() {
        let source = CountingSource::new(&[]);
        let found = ranker().rank(&source, "hobbit", 10, 0.0).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_ranking_is_idempotent() {
        let source = fantasy();
        let ranker = ranker();
        let first = ranker.rank(&source, "tolkien", 10, 0.0).await.unwrap();
        let second = ranker.rank(&source, "tolkien", 10, 0.0).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[tokio::test]
    async fn test_ties_keep_retrieval_order() {
        // Both spellings of the author fold to the same text and score alike.
        let source = CountingSource::new(&[("Emma", "Austen"), ("Emma", "AUSTEN")]);
        let found = ranker().rank(&source, "emma", 10, 0.0).await.unwrap();
        let authors: Vec<_> = found.iter().map(|b| b.author).collect();
        assert_eq!(authors, ["Austen", "AUSTEN"]);

        let source = CountingSource::new(&[("Emma", "AUSTEN"), ("Emma", "Austen")]);
        let found = ranker().rank(&source, "emma", 10, 0.0).await.unwrap();
        let authors: Vec<_> = found.iter().map(|b| b.author).collect();
        assert_eq!(authors, ["AUSTEN", "Austen"]);
    }

    #[tokio::test]
    async fn test_higher_threshold_never_returns_more() {
        let source = fantasy();
        let ranker = ranker();
        let mut previous = usize::MAX;
        for min_score in [0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0] {
            let found = ranker.rank(&source, "tolkien hobbit", 10, min_score).await.unwrap();
            assert!(found.len() <= previous, "min_score {min_score} returned more results");
            previous = found.len();
        }
    }

    #[tokio::test]
    async fn test_limit_truncates_best_first() {
        let source = fantasy();
        let ranker = ranker();
        let all = ranker.rank(&source, "tolkien", 10, 0.0).await.unwrap();
        let top = ranker.rank(&source, "tolkien", 2, 0.0).await.unwrap();
        assert_eq!(top, all[..2]);
    }

    #[tokio::test]
    async fn test_batches_reach_every_candidate() {
        let config = SearchConfig {
            candidate_limit: 1,
            ..SearchConfig::default()
        };
        let source = fantasy();
        let batched = Ranker::new(&config).rank(&source, "tolkien", 10, 0.0).await.unwrap();
        // Three single-entry batches, then an empty one.
        assert_eq!(source.calls(), 4);
        assert_eq!(batched, ranker().rank(&source, "tolkien", 10, 0.0).await.unwrap());
        assert_eq!(batched.len(), 3);
    }

    #[tokio::test]
    async fn test_best_match_in_a_late_batch_wins() {
        let mut books: Vec<(&'static str, &'static str)> = vec![("Orbit", "Anonymous"); 50];
        books.push(("Hobbit", "Tolkien"));
        let source = CountingSource::new(&books);
        let config = SearchConfig {
            candidate_limit: 10,
            ..SearchConfig::default()
        };
        let found = Ranker::new(&config).rank(&source, "hobit", 3, 0.0).await.unwrap();
        assert_eq!(found.len(), 3);
        assert_eq!(found[0], Book { title: "Hobbit", author: "Tolkien" });
        assert_eq!(source.calls(), 6);
    }
}
