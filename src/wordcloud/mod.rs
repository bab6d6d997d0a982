//! Keyword weights for word-cloud rendering.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::keywords::{tokenize, KeywordCase, KeywordSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordWeight {
    pub word: String,
    pub count: usize,
    /// `count` relative to the most frequent keyword, in `0.0..=1.0`
    pub weight: f64,
}

/// Weight each keyword by how often it occurs in `text`.
///
/// Results are sorted by descending count, then alphabetically, and cut to
/// `limit` entries.
pub fn word_weights(text: &str, keywords: &KeywordSet, case: KeywordCase, limit: usize) -> Vec<WordWeight> {
    let mut counts: HashMap<&str, usize> = keywords.iter().map(|k| (k.as_str(), 0)).collect();

    for token in tokenize(text) {
        let token = case.apply(token);
        if let Some(count) = counts.get_mut(token.as_str()) {
            *count += 1;
        }
    }

    let max = counts.values().copied().max().unwrap_or(0).max(1);
    let mut weights: Vec<WordWeight> = counts
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(word, count)| WordWeight {
            word: word.to_string(),
            count,
            weight: count as f64 / max as f64,
        })
        .collect();

    weights.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    weights.truncate(limit);
    weights
}
