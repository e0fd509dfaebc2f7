//! Tuning values for the search pipeline.
//!
//! Everything here is locale or catalog specific, so it is configuration data
//! rather than code. The defaults are tuned for a small Russian-language
//! fiction catalog with the occasional English title.

use serde::{Deserialize, Serialize};

/// Function words of the catalog's languages that never carry meaning on
/// their own. Anything shorter than [`SearchConfig::min_token_len`] is dropped
/// anyway, so only longer words need listing.
const DEFAULT_STOP_WORDS: &[&str] = &[
    // Russian
    "без", "был", "была", "были", "было", "быть", "вам", "вас", "весь", "все", "всё", "всех", "где", "для",
    "его", "ее", "её", "если", "есть", "еще", "ещё", "или", "как", "когда", "кто", "меня", "мне", "над", "нас",
    "нет", "них", "она", "они", "оно", "под", "при", "про", "так", "там", "тебя", "тем", "что", "чтобы", "это",
    "эта", "этот", "уже",
    // English
    "and", "are", "but", "for", "from", "not", "the", "this", "that", "was", "with", "you",
];

/// Immutable configuration shared by the [`Tokenizer`](crate::Tokenizer),
/// [`Scorer`](crate::Scorer) and [`Ranker`](crate::Ranker).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of results returned to the caller.
    pub limit: usize,
    /// Candidates scoring below this are discarded.
    pub min_score: f64,
    /// Candidates pulled from the store per batch. Bounds memory and the size
    /// of each query, not the number of entries scored.
    pub candidate_limit: usize,
    /// Tokens shorter than this (in characters) are ignored.
    pub min_token_len: usize,
    pub title_weight: f64,
    pub author_weight: f64,
    /// Added to the title score when the whole query is a substring of the title.
    pub exact_substring_bonus: f64,
    /// Added to the title score for every query token found in the title.
    pub title_token_bonus: f64,
    /// Added to the author score for every query token found in the author.
    pub author_token_bonus: f64,
    /// Added once to the title score when every query token is in the title.
    pub all_tokens_bonus: f64,
    pub stop_words: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: 10,
            min_score: 60.0,
            candidate_limit: 1000,
            min_token_len: 3,
            title_weight: 0.7,
            author_weight: 0.3,
            exact_substring_bonus: 25.0,
            title_token_bonus: 10.0,
            author_token_bonus: 5.0,
            all_tokens_bonus: 15.0,
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}
