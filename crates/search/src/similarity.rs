//! String similarity metrics on a 0–100 scale.
//!
//! All metrics are built on normalized Levenshtein similarity and expect
//! input that already went through [`preprocess`]. Each one has a blind spot
//! the others cover:
//!
//! - [`ratio`] compares the strings as a whole and punishes length differences.
//! - [`partial_ratio`] finds the best aligned substring, so a short query
//!   inside a long title scores high (too high for very short queries).
//! - [`token_set_ratio`] ignores word order and repeated words, but not typos.
//! - [`weighted_ratio`] blends the above depending on the length ratio.

use std::collections::BTreeSet;

const UNBASE_SCALE: f64 = 0.95;

/// Lowercases, replaces every non-alphanumeric character with a space and
/// collapses whitespace.
pub fn preprocess(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Whole-string similarity. Empty input never matches anything.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(a, b) * 100.0
}

/// Best [`ratio`] of the shorter string against every equally long window of
/// the longer one.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (short, long) = match a_chars.len() <= b_chars.len() {
        true => (a_chars, b_chars),
        false => (b_chars, a_chars),
    };
    if short.is_empty() {
        return 0.0;
    }
    if short.len() == long.len() {
        return ratio(a, b);
    }
    let needle: String = short.iter().collect();
    let mut best = 0.0_f64;
    for window in long.windows(short.len()) {
        let window: String = window.iter().collect();
        best = best.max(ratio(&needle, &window));
        if best >= 100.0 {
            break;
        }
    }
    best
}

/// [`ratio`] of both strings after sorting their words.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Order- and duplication-insensitive word comparison.
///
/// Words shared by both strings form an intersection; when one side has no
/// words beyond the intersection it is fully contained in the other and the
/// score is 100. Otherwise the best [`ratio`] between the intersection and
/// each side (intersection plus remainder) wins.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let a_tokens: BTreeSet<&str> = a.split_whitespace().collect();
    let b_tokens: BTreeSet<&str> = b.split_whitespace().collect();
    if a_tokens.is_empty() || b_tokens.is_empty() {
        return 0.0;
    }
    let intersection = join(a_tokens.intersection(&b_tokens));
    let only_a = join(a_tokens.difference(&b_tokens));
    let only_b = join(b_tokens.difference(&a_tokens));
    if !intersection.is_empty() && (only_a.is_empty() || only_b.is_empty()) {
        return 100.0;
    }
    let combined_a = join_nonempty(&intersection, &only_a);
    let combined_b = join_nonempty(&intersection, &only_b);
    let mut best = ratio(&combined_a, &combined_b);
    if !intersection.is_empty() {
        best = best.max(ratio(&intersection, &combined_a)).max(ratio(&intersection, &combined_b));
    }
    best
}

/// Holistic similarity that picks the most appropriate metric by how much
/// the two lengths differ.
///
/// Strings of similar length are compared whole or word-wise. Once one is at
/// least 1.5 times longer, substring alignment takes over, scaled down so
/// that a partial match never beats an equally good full match.
pub fn weighted_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let base = ratio(a, b);
    let (len_a, len_b) = (a.chars().count() as f64, b.chars().count() as f64);
    let len_ratio = len_a.max(len_b) / len_a.min(len_b);
    if len_ratio < 1.5 {
        return base
            .max(token_sort_ratio(a, b) * UNBASE_SCALE)
            .max(token_set_ratio(a, b) * UNBASE_SCALE);
    }
    let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
    base.max(partial_ratio(a, b) * partial_scale)
        .max(token_set_ratio(a, b) * UNBASE_SCALE * partial_scale)
}

fn sorted_tokens(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn join<'a, 'b: 'a>(tokens: impl Iterator<Item = &'a &'b str>) -> String {
    tokens.copied().collect::<Vec<_>>().join(" ")
}

fn join_nonempty(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{head} {tail}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn approx(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < 0.01
    }

    #[rstest]
    #[case("  The  Hobbit! ", "the hobbit")]
    #[case("Мастер и Маргарита", "мастер и маргарита")]
    #[case("Sherlock Holmes: A Study in Scarlet", "sherlock holmes a study in scarlet")]
    #[case("---", "")]
    fn test_preprocess(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(preprocess(input), expected);
    }

    #[test]
    fn test_ratio() {
        assert!(approx(ratio("hobbit", "hobbit"), 100.0));
        // One deletion across six characters.
        assert!(approx(ratio("hobit", "hobbit"), 100.0 * 5.0 / 6.0));
        assert_eq!(ratio("", "hobbit"), 0.0);
        assert_eq!(ratio("", ""), 0.0);
    }

    #[test]
    fn test_partial_ratio_finds_substring() {
        assert!(approx(partial_ratio("hobbit", "the hobbit or there and back again"), 100.0));
        assert!(approx(partial_ratio("the hobbit or there and back again", "hobbit"), 100.0));
        assert!(partial_ratio("dune", "the hobbit") < 50.0);
        assert_eq!(partial_ratio("", "the hobbit"), 0.0);
    }

    #[test]
    fn test_token_sort_ratio_ignores_order() {
        assert!(approx(token_sort_ratio("tolkien john", "john tolkien"), 100.0));
    }

    #[rstest]
    #[case("hobbit the", "the hobbit", 100.0)]
    #[case("hobbit", "the hobbit", 100.0)]
    #[case("hobbit hobbit", "hobbit", 100.0)]
    fn test_token_set_ratio_containment(#[case] a: &str, #[case] b: &str, #[case] expected: f64) {
        assert!(approx(token_set_ratio(a, b), expected));
    }

    #[test]
    fn test_token_set_ratio_is_not_typo_tolerant_on_its_own() {
        let score = token_set_ratio("hobit", "the hobbit");
        assert!(score < 100.0);
        assert!(score > 0.0);
    }

    #[test]
    fn test_weighted_ratio() {
        assert!(approx(weighted_ratio("war and peace", "war and peace"), 100.0));
        assert!(weighted_ratio("peace and war", "war and peace") >= 95.0 - 0.01);
        // Short query against a long title: partial alignment scaled by 0.9.
        assert!(approx(weighted_ratio("hobbit", "the hobbit or there and back again"), 90.0));
        assert_eq!(weighted_ratio("", "hobbit"), 0.0);
    }

    #[test]
    fn test_metrics_stay_in_range() {
        let pairs = [("a", "b"), ("hobbit", "silmarillion"), ("мир", "война и мир"), ("x y z", "z y x")];
        for (a, b) in pairs {
            for score in [ratio(a, b), partial_ratio(a, b), token_set_ratio(a, b), weighted_ratio(a, b)] {
                assert!((0.0..=100.0).contains(&score), "{a:?} vs {b:?} scored {score}");
            }
        }
    }
}
