//! Candidate retrieval.
//!
//! Retrieval is deliberately loose: it only has to make sure nothing relevant
//! is missed while keeping the candidate set small enough to score. The
//! actual matching runs wherever the catalog lives (see [`CandidateSource`]),
//! this module only decides *what* to match.

use crate::error::Result;
use crate::tokenize::{Tokenizer, normalize_phrase};
use async_trait::async_trait;

/// Anything with a title and an author can be searched.
pub trait Entry {
    fn title(&self) -> &str;
    fn author(&self) -> &str;
}

/// Length (in characters) of the token fragments used for retrieval.
pub const FRAGMENT_LEN: usize = 3;

/// Which substring filter a [`CandidateSource`] has to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Retrieval {
    /// An entry is a candidate if *any* fragment is a case-insensitive
    /// substring of its title or its author. Fragments are the overlapping
    /// [`FRAGMENT_LEN`]-character windows of every query token (shorter
    /// tokens are kept whole), so a token with a typo still shares fragments
    /// with the word it was meant to be.
    Fragments(Vec<String>),
    /// The query had no significant tokens, so the whole (trimmed,
    /// lowercased) phrase is matched against title or author instead.
    Phrase(String),
}

impl Retrieval {
    /// Plans retrieval for a raw query, or returns `None` when the query is
    /// empty and there is nothing to retrieve.
    pub fn plan(tokenizer: &Tokenizer, query: &str) -> Option<Self> {
        let phrase = normalize_phrase(query);
        if phrase.is_empty() {
            return None;
        }
        let tokens = tokenizer.tokenize(&phrase);
        if tokens.is_empty() {
            return Some(Self::Phrase(phrase));
        }
        // Order is irrelevant to a disjunction, duplicates only cost binds.
        let mut seen = std::collections::HashSet::new();
        let patterns = tokens
            .iter()
            .flat_map(|token| fragments(token))
            .filter(|fragment| seen.insert(fragment.clone()))
            .collect();
        Some(Self::Fragments(patterns))
    }

    /// Lowercase substrings, any of which makes an entry a candidate.
    pub fn patterns(&self) -> &[String] {
        match self {
            Self::Fragments(fragments) => fragments,
            Self::Phrase(phrase) => std::slice::from_ref(phrase),
        }
    }

    /// Reference semantics of the filter, for sources that match in memory.
    pub fn matches(&self, entry: &impl Entry) -> bool {
        let title = entry.title().to_lowercase();
        let author = entry.author().to_lowercase();
        self.patterns()
            .iter()
            .any(|pattern| title.contains(pattern.as_str()) || author.contains(pattern.as_str()))
    }
}

fn fragments(token: &str) -> Vec<String> {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= FRAGMENT_LEN {
        return vec![token.to_string()];
    }
    chars.windows(FRAGMENT_LEN).map(|window| window.iter().collect()).collect()
}

/// A catalog that can produce search candidates.
///
/// Implementations must apply [`Retrieval`]'s filter and return the matching
/// entries in a stable order, skipping the first `offset` and returning at
/// most `limit`. The [`Ranker`](crate::Ranker) pages through every match this
/// way, so the order must not change between calls.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    type Entry: Entry + Send;

    async fn candidates(&self, retrieval: &Retrieval, offset: usize, limit: usize) -> Result<Vec<Self::Entry>>;
}

/// A plain list of entries is a catalog too (handy for small, static sets).
#[async_trait]
impl<E> CandidateSource for Vec<E>
where
    E: Entry + Clone + Send + Sync,
{
    type Entry = E;

    async fn candidates(&self, retrieval: &Retrieval, offset: usize, limit: usize) -> Result<Vec<E>> {
        Ok(self
            .iter()
            .filter(|entry| retrieval.matches(*entry))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}
