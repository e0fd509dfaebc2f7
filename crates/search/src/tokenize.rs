//! Query normalization.

use crate::config::SearchConfig;
use std::collections::HashSet;

/// Splits free text into significant lowercase word tokens.
///
/// A token is a maximal run of alphanumeric characters. Tokens shorter than
/// the configured minimum length, and configured stop-words, are dropped.
///
/// ```
/// use shelf_search::{SearchConfig, Tokenizer};
///
/// let tokenizer = Tokenizer::new(&SearchConfig::default());
/// assert_eq!(tokenizer.tokenize("The Lord of the Rings"), vec!["lord", "rings"]);
/// assert!(tokenizer.tokenize("  of, a  ").is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Tokenizer {
    min_len: usize,
    stop_words: HashSet<String>,
}

impl Tokenizer {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            min_len: config.min_token_len,
            stop_words: config.stop_words.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    /// Ordered tokens of `text`. Duplicates are kept; an empty result means
    /// the caller has to fall back to matching the whole phrase.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| word.chars().count() >= self.min_len)
            .filter(|word| !self.stop_words.contains(*word))
            .map(str::to_string)
            .collect()
    }
}

/// Trimmed, lowercased form of the raw query used for phrase-level matching.
pub fn normalize_phrase(text: &str) -> String {
    text.trim().to_lowercase()
}
