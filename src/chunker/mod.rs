//! Splits long text into bounded pieces for the summarizer.
//!
//! Chunks always partition the input: concatenating them in order gives back
//! the original text byte for byte, whatever boundary policy is used.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default maximum chunk size in characters
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 1000;

/// A contiguous slice of the source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position of the chunk in the sequence
    pub index: usize,

    /// Byte offset of the chunk in the source text
    pub offset: usize,

    /// Chunk contents
    pub text: String,
}

impl Chunk {
    /// Length in characters
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Byte range of the chunk in the source text
    pub fn byte_range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.text.len()
    }
}

/// Where a chunk is allowed to end
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryPolicy {
    /// Fixed windows of `max_size` characters; may cut mid-word
    #[default]
    Character,
    /// End after the last whitespace inside the window
    Word,
    /// End after the last sentence terminator inside the window
    Sentence,
}

impl BoundaryPolicy {
    /// Byte length of the chunk to take from a full window. `next` is the
    /// first character after the window.
    ///
    /// Always in `1..=window.len()` for a non-empty window.
    fn cut(self, window: &str, next: Option<char>) -> usize {
        match self {
            BoundaryPolicy::Character => window.len(),
            BoundaryPolicy::Word => word_cut(window).unwrap_or(window.len()),
            BoundaryPolicy::Sentence => sentence_cut(window, next)
                .or_else(|| word_cut(window))
                .unwrap_or(window.len()),
        }
    }
}

impl std::fmt::Display for BoundaryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundaryPolicy::Character => write!(f, "character"),
            BoundaryPolicy::Word => write!(f, "word"),
            BoundaryPolicy::Sentence => write!(f, "sentence"),
        }
    }
}

fn word_cut(window: &str) -> Option<usize> {
    window
        .char_indices()
        .filter(|(_, c)| c.is_whitespace())
        .last()
        .map(|(i, c)| i + c.len_utf8())
}

/// Cut after the whitespace that follows the last terminator. A terminator
/// that is the window's last character ends the chunk itself when the text
/// beyond the window continues with whitespace.
fn sentence_cut(window: &str, next: Option<char>) -> Option<usize> {
    let mut cut = None;
    let mut chars = window.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            match chars.peek() {
                Some(&(j, following)) if following.is_whitespace() => {
                    cut = Some(j + following.len_utf8());
                }
                None if next.is_some_and(char::is_whitespace) => cut = Some(window.len()),
                _ => {}
            }
        }
    }

    cut
}

/// Split `text` into chunks of at most `max_size` characters.
///
/// Empty text yields no chunks. A `max_size` of zero is treated as one.
pub fn chunk_text(text: &str, max_size: usize, policy: BoundaryPolicy) -> Vec<Chunk> {
    let max_size = max_size.max(1);
    let mut chunks = Vec::new();
    let mut offset = 0;

    while offset < text.len() {
        let rest = &text[offset..];
        let window_end = rest
            .char_indices()
            .nth(max_size)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());

        // The tail fits whole, no boundary search needed
        let cut = if window_end == rest.len() {
            window_end
        } else {
            policy.cut(&rest[..window_end], rest[window_end..].chars().next())
        };

        chunks.push(Chunk {
            index: chunks.len(),
            offset,
            text: rest[..cut].to_string(),
        });
        offset += cut;
    }

    chunks
}
