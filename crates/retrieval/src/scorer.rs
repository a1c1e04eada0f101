//! Keyword relevance scoring.
//!
//! score(doc) = sum over distinct query tokens of at least
//! [`MIN_TOKEN_CHARS`] characters of their whole-word hit count in the
//! document, plus [`BONUS_WEIGHT`] for each [`BONUS_TERMS`] entry that occurs
//! anywhere in the document. Matching is case-insensitive.

use crate::types::{Corpus, ScoredDocument};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Shorter query tokens are ignored.
pub const MIN_TOKEN_CHARS: usize = 3;

/// Terms that mark regulatory content, rewarded regardless of the query.
pub const BONUS_TERMS: [&str; 7] = [
    "use",
    "permitted",
    "special",
    "parking",
    "definition",
    "district",
    "table",
];

pub const BONUS_WEIGHT: f64 = 0.25;

/// Lower-case `query`, split it on runs of non-alphanumeric characters and
/// deduplicate.
pub fn tokenize_query(query: &str) -> BTreeSet<String> {
    query
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Count occurrences of `token` in `haystack` that are not glued to an
/// alphanumeric character on either side. Both arguments are expected in
/// lower case.
pub fn count_whole_word(haystack: &str, token: &str) -> usize {
    if token.is_empty() {
        return 0;
    }

    haystack
        .match_indices(token)
        .filter(|(start, _)| {
            let before = haystack[..*start].chars().next_back();
            let after = haystack[start + token.len()..].chars().next();
            !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        })
        .count()
}

/// Score a single lower-cased document against prepared tokens.
fn score_text(lowered: &str, tokens: &[&str]) -> f64 {
    let hits: usize = tokens
        .iter()
        .map(|token| count_whole_word(lowered, token))
        .sum();

    let bonus = BONUS_TERMS
        .iter()
        .filter(|term| lowered.contains(*term))
        .count() as f64
        * BONUS_WEIGHT;

    hits as f64 + bonus
}

/// Score every document and order them by score, highest first.
///
/// The sort is stable: equal scores keep corpus order.
pub fn score_documents<'a>(corpus: &'a Corpus, query: &str) -> Vec<ScoredDocument<'a>> {
    let tokens = tokenize_query(query);
    let tokens: Vec<&str> = tokens
        .iter()
        .map(String::as_str)
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .collect();

    let mut scored: Vec<ScoredDocument<'a>> = corpus
        .documents()
        .iter()
        .map(|document| ScoredDocument {
            document,
            score: score_text(&document.text.to_lowercase(), &tokens),
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    tracing::debug!(
        documents = scored.len(),
        tokens = tokens.len(),
        top = scored.first().map(|s| s.score).unwrap_or(0.0),
        "Scored corpus"
    );

    scored
}
