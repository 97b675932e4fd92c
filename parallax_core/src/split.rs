// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Word and character splitting for text reveals.
//!
//! Word and character reveals animate the pieces of an element's text
//! individually, so the text is first rewritten into one inline span per piece.
//! The rewrite is a one-time transform: [`SplitLedger`] records which nodes
//! have been split (and the host also stamps a marker attribute), so a
//! refresh or a second engine never wraps the same text twice.
//!
//! Character splitting also feeds the per-character drive category, which
//! animates the non-space spans created here.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::host::Document;
use crate::time::Duration;

/// Attribute stamped on split elements, valued with [`SplitMode::as_str`].
pub const SPLIT_MARKER: &str = "data-split";

/// Class of word spans.
pub const WORD_CLASS: &str = "word";

/// Class of character spans.
pub const CHAR_CLASS: &str = "char";

/// Class of whitespace placeholder spans, in addition to [`CHAR_CLASS`].
pub const CHAR_SPACE_CLASS: &str = "char char-space";

/// Extra class carried by whitespace placeholders.
pub const SPACE_CLASS: &str = "char-space";

/// Non-breaking space used for whitespace placeholders.
pub const NBSP: &str = "\u{a0}";

/// How an element's text is split.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SplitMode {
    /// One span per whitespace-separated word.
    Words,
    /// One span per character.
    Chars,
}

impl SplitMode {
    /// Marker attribute value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Words => "words",
            Self::Chars => "chars",
        }
    }
}

/// One child produced by splitting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextSegment {
    /// A bare text node.
    Text(String),
    /// An inline span.
    Span {
        /// Span text.
        text: String,
        /// Space-separated class list.
        class: &'static str,
        /// `transition-delay` for the span, if any.
        delay: Option<Duration>,
    },
}

impl TextSegment {
    /// Returns `true` for spans.
    #[must_use]
    pub fn is_span(&self) -> bool {
        matches!(self, Self::Span { .. })
    }
}

/// Splits `text` into word spans separated by single spaces.
///
/// Word `i` gets a delay of `step × i`. Runs of whitespace collapse to one
/// space, matching how the text renders.
#[must_use]
pub fn split_words(text: &str, step: Duration) -> Vec<TextSegment> {
    let mut segments = Vec::new();
    for (index, word) in (0_u64..).zip(text.split_whitespace()) {
        if index > 0 {
            segments.push(TextSegment::Text(" ".to_string()));
        }
        segments.push(TextSegment::Span {
            text: word.to_string(),
            class: WORD_CLASS,
            delay: Some(step.saturating_mul(index)),
        });
    }
    segments
}

/// Splits `text` into one span per character.
///
/// Whitespace becomes a non-breaking placeholder span without a delay and is
/// skipped by the indexing; non-space character `i` gets `step × i`.
#[must_use]
pub fn split_chars(text: &str, step: Duration) -> Vec<TextSegment> {
    let mut segments = Vec::new();
    let mut index = 0_u64;
    for ch in text.trim().chars() {
        if ch.is_whitespace() {
            segments.push(TextSegment::Span {
                text: NBSP.to_string(),
                class: CHAR_SPACE_CLASS,
                delay: None,
            });
        } else {
            segments.push(TextSegment::Span {
                text: ch.to_string(),
                class: CHAR_CLASS,
                delay: Some(step.saturating_mul(index)),
            });
            index += 1;
        }
    }
    segments
}

/// Records which nodes have been split.
#[derive(Clone, Debug)]
pub struct SplitLedger<N> {
    entries: Vec<(N, SplitMode)>,
}

impl<N> Default for SplitLedger<N> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<N: PartialEq> SplitLedger<N> {
    /// Returns `true` if `node` has been split in any mode.
    #[must_use]
    pub fn contains(&self, node: &N) -> bool {
        self.entries.iter().any(|(n, _)| n == node)
    }

    /// The mode `node` was split with.
    #[must_use]
    pub fn mode_of(&self, node: &N) -> Option<SplitMode> {
        self.entries
            .iter()
            .find_map(|(n, mode)| (n == node).then_some(*mode))
    }

    /// Records `node` as split.
    pub fn insert(&mut self, node: N, mode: SplitMode) {
        if !self.contains(&node) {
            self.entries.push((node, mode));
        }
    }

    /// Splits `node` unless it was split before, by this ledger or by anyone
    /// who left the [`SPLIT_MARKER`] attribute. Returns `true` if the
    /// document was rewritten.
    pub fn ensure<D>(&mut self, doc: &mut D, node: &N, mode: SplitMode, step: Duration) -> bool
    where
        D: Document<Node = N>,
        N: Clone,
    {
        if self.contains(node) {
            return false;
        }
        if let Some(existing) = doc.attribute(node, SPLIT_MARKER) {
            let mode = if existing == SplitMode::Words.as_str() {
                SplitMode::Words
            } else {
                SplitMode::Chars
            };
            self.insert(node.clone(), mode);
            return false;
        }
        let text = doc.text_content(node);
        let segments = match mode {
            SplitMode::Words => split_words(&text, step),
            SplitMode::Chars => split_chars(&text, step),
        };
        doc.replace_children(node, &segments);
        doc.set_attribute(node, SPLIT_MARKER, mode.as_str());
        self.insert(node.clone(), mode);
        true
    }

    /// Number of split nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been split.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_texts(segments: &[TextSegment]) -> Vec<&str> {
        segments
            .iter()
            .filter_map(|s| match s {
                TextSegment::Span { text, .. } => Some(text.as_str()),
                TextSegment::Text(_) => None,
            })
            .collect()
    }

    #[test]
    fn words_get_incremental_delays() {
        let segments = split_words("  Scroll   into\nview ", Duration::from_millis(60));
        assert_eq!(span_texts(&segments), ["Scroll", "into", "view"]);
        assert_eq!(segments.len(), 5, "three words, two separators");

        let delays: Vec<_> = segments
            .iter()
            .filter_map(|s| match s {
                TextSegment::Span { delay, .. } => *delay,
                TextSegment::Text(_) => None,
            })
            .collect();
        assert_eq!(
            delays,
            [
                Duration::from_millis(0),
                Duration::from_millis(60),
                Duration::from_millis(120)
            ]
        );
    }

    #[test]
    fn chars_keep_space_placeholders_out_of_indexing() {
        let segments = split_chars("ab c", Duration::from_millis(30));
        assert_eq!(segments.len(), 4);
        assert_eq!(
            segments[2],
            TextSegment::Span {
                text: NBSP.to_string(),
                class: CHAR_SPACE_CLASS,
                delay: None,
            }
        );
        assert_eq!(
            segments[3],
            TextSegment::Span {
                text: "c".to_string(),
                class: CHAR_CLASS,
                delay: Some(Duration::from_millis(60)),
            },
            "'c' is the third non-space character"
        );
    }

    #[test]
    fn empty_text_produces_nothing() {
        assert!(split_words("   ", Duration::from_millis(60)).is_empty());
        assert!(split_chars("", Duration::from_millis(30)).is_empty());
    }

    #[test]
    fn ledger_is_a_set() {
        let mut ledger = SplitLedger::default();
        ledger.insert(3_u32, SplitMode::Chars);
        ledger.insert(3_u32, SplitMode::Words);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.mode_of(&3), Some(SplitMode::Chars), "first mode wins");
        assert!(!ledger.contains(&4));
    }
}
