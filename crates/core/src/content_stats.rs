//! Character and word statistics for document bodies.
//!
//! [`stats`] feeds snapshot metadata and counts raw text, markdown included.
//! [`text_stats`] is the reader-facing variant that strips markdown syntax
//! before counting words and estimates a reading time.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Average reading speed used for reading-time estimates.
pub const WORDS_PER_MINUTE: usize = 200;

// ---------------------------------------------------------------------------
// Snapshot stats
// ---------------------------------------------------------------------------

/// Counts recorded alongside every snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContentStats {
    pub char_count: usize,
    pub word_count: usize,
}

/// Compute the character and word counts of `body`.
///
/// Characters are Unicode scalar values, not bytes. Words are the non-empty
/// runs between whitespace.
pub fn stats(body: &str) -> ContentStats {
    ContentStats {
        char_count: char_len(body),
        word_count: body.split_whitespace().count(),
    }
}

/// Length of `text` in characters.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

// ---------------------------------------------------------------------------
// Reader stats
// ---------------------------------------------------------------------------

/// Reader-facing statistics for a markdown body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextStats {
    /// Words in the rendered text (markdown syntax removed).
    pub words: usize,
    /// Characters in the raw source.
    pub characters: usize,
    /// Non-whitespace characters in the raw source.
    pub characters_no_spaces: usize,
    /// Estimated reading time, rounded up.
    pub reading_time_mins: usize,
}

/// Ordered markdown stripping passes as `(pattern, replacement)`.
///
/// Images run before links so `![alt](src)` is not half-matched as a link.
static MARKDOWN_PASSES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?s)```.*?```", ""),
        (r"`[^`]*`", ""),
        (r"!\[[^\]]*\]\([^)]+\)", ""),
        (r"\[([^\]]+)\]\([^)]+\)", "$1"),
        (r"(?m)^#{1,6}\s+", ""),
        (r"\*\*(.*?)\*\*", "$1"),
        (r"__(.*?)__", "$1"),
        (r"\*(.*?)\*", "$1"),
        (r"_(.*?)_", "$1"),
        (r"(?m)^>\s+", ""),
        (r"(?m)^[-*+]\s+", ""),
        (r"(?m)^\d+\.\s+", ""),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).expect("valid regex"), replacement))
    .collect()
});

/// Remove markdown syntax, keeping the visible text.
pub fn strip_markdown(text: &str) -> String {
    MARKDOWN_PASSES
        .iter()
        .fold(text.to_string(), |acc, (re, replacement)| {
            re.replace_all(&acc, *replacement).into_owned()
        })
}

/// Compute [`TextStats`] for a markdown body.
pub fn text_stats(text: &str) -> TextStats {
    let words = strip_markdown(text).split_whitespace().count();
    TextStats {
        words,
        characters: char_len(text),
        characters_no_spaces: text.chars().filter(|c| !c.is_whitespace()).count(),
        reading_time_mins: words.div_ceil(WORDS_PER_MINUTE),
    }
}

/// Human-readable reading time label.
pub fn format_reading_time(minutes: usize) -> String {
    match minutes {
        0 => "< 1 min read".to_string(),
        1 => "1 min read".to_string(),
        n => format!("{n} min read"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
