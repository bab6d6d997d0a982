//! Keyword extraction.
//!
//! The default extractor keeps alphabetic tokens that are not English stop
//! words. Tokens keep their surface form unless [`KeywordCase::Lowercase`] is
//! configured; the stop-word test itself is always case-insensitive, so
//! "The" and "the" are both dropped.

use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::CapabilityError;

mod stop_words;

pub use stop_words::is_stop_word;

/// A normalized content word
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keyword(String);

impl Keyword {
    pub fn new(word: impl Into<String>) -> Self {
        Self(word.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Keyword {
    fn from(word: &str) -> Self {
        Self::new(word)
    }
}

/// Deduplicated keywords, iterated in sorted order
pub type KeywordSet = BTreeSet<Keyword>;

/// Case normalization applied to extracted keywords
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordCase {
    /// Keep the surface form as it appears in the text
    #[default]
    Preserve,
    /// Lowercase every keyword
    Lowercase,
}

impl KeywordCase {
    pub fn apply(self, token: &str) -> String {
        match self {
            KeywordCase::Preserve => token.to_string(),
            KeywordCase::Lowercase => token.to_lowercase(),
        }
    }
}

/// Tags the full transcript text and returns its content words
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeywordExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<KeywordSet, CapabilityError>;
}

/// Local extractor using an English stop-word list
#[derive(Debug, Clone, Default)]
pub struct StopWordExtractor {
    case: KeywordCase,
}

impl StopWordExtractor {
    pub fn new(case: KeywordCase) -> Self {
        Self { case }
    }

    pub fn extract_sync(&self, text: &str) -> KeywordSet {
        tokenize(text)
            .filter(|token| !is_stop_word(token))
            .map(|token| Keyword::new(self.case.apply(token)))
            .collect()
    }
}

#[async_trait]
impl KeywordExtractor for StopWordExtractor {
    async fn extract(&self, text: &str) -> Result<KeywordSet, CapabilityError> {
        Ok(self.extract_sync(text))
    }
}

/// Split text into alphabetic tokens.
///
/// Punctuation, digits and symbols separate tokens. A possessive `'s` is
/// dropped; any other token containing an apostrophe is a contraction and is
/// skipped entirely.
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphabetic() || is_apostrophe(c)))
        .filter_map(|piece| {
            let piece = piece.trim_matches(is_apostrophe);
            let piece = piece
                .strip_suffix("'s")
                .or_else(|| piece.strip_suffix("\u{2019}s"))
                .unwrap_or(piece);

            if piece.is_empty() || piece.contains(is_apostrophe) {
                None
            } else {
                Some(piece)
            }
        })
}

fn is_apostrophe(c: char) -> bool {
    c == '\'' || c == '\u{2019}'
}
