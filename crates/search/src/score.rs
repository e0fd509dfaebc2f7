//! Relevance scoring of a single catalog entry against a query.

use crate::config::SearchConfig;
use crate::retrieve::Entry;
use crate::similarity::{partial_ratio, preprocess, token_set_ratio, weighted_ratio};
use crate::tokenize::{Tokenizer, normalize_phrase};

/// Highest score an entry can get.
pub const MAX_SCORE: f64 = 100.0;

/// Computes bounded relevance scores from several similarity metrics plus a
/// stack of deterministic bonuses for exact and per-token matches.
#[derive(Debug, Clone)]
pub struct Scorer {
    config: SearchConfig,
    tokenizer: Tokenizer,
}

impl Scorer {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            config: config.clone(),
            tokenizer: Tokenizer::new(config),
        }
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Does the query-only work once, so that scoring many entries against
    /// the same query doesn't re-tokenize it every time.
    pub fn prepare<'a>(&'a self, query: &str) -> PreparedQuery<'a> {
        PreparedQuery {
            scorer: self,
            processed: preprocess(query),
            phrase: normalize_phrase(query),
            tokens: self.tokenizer.tokenize(query),
        }
    }

    /// Score of `entry` for `query`, in `[0, 100]`.
    pub fn score(&self, query: &str, entry: &impl Entry) -> f64 {
        self.prepare(query).score(entry)
    }
}

/// A query ready to be scored against any number of entries.
#[derive(Debug)]
pub struct PreparedQuery<'a> {
    scorer: &'a Scorer,
    processed: String,
    phrase: String,
    tokens: Vec<String>,
}

impl PreparedQuery<'_> {
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn score(&self, entry: &impl Entry) -> f64 {
        let config = &self.scorer.config;
        let title = entry.title().to_lowercase();
        let author = entry.author().to_lowercase();

        let mut title_score = self.similarity(&title);
        let mut author_score = self.similarity(&author);

        if !self.phrase.is_empty() && title.contains(&self.phrase) {
            title_score += config.exact_substring_bonus;
        }

        let mut in_title = 0;
        for token in &self.tokens {
            if title.contains(token.as_str()) {
                title_score += config.title_token_bonus;
                in_title += 1;
            }
            if author.contains(token.as_str()) {
                author_score += config.author_token_bonus;
            }
        }
        if !self.tokens.is_empty() && in_title == self.tokens.len() {
            title_score += config.all_tokens_bonus;
        }

        let total = config.title_weight * title_score + config.author_weight * author_score;
        total.clamp(0.0, MAX_SCORE)
    }

    /// Best of the three independent metrics against one field.
    fn similarity(&self, field: &str) -> f64 {
        let field = preprocess(field);
        weighted_ratio(&self.processed, &field)
            .max(token_set_ratio(&self.processed, &field))
            .max(partial_ratio(&self.processed, &field))
    }
}
