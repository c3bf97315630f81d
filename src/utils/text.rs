//! Text tokenization helpers shared by the extractor and classifier.

use std::collections::HashSet;

/// Count whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Lowercased word tokens (alphanumeric runs, underscores included).
pub fn word_tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
}

/// The set of distinct lowercased word tokens in `text`.
pub fn word_set(text: &str) -> HashSet<String> {
    word_tokens(text).collect()
}

/// Number of sentence segments produced by splitting on runs of `.`, `!`, `?`.
///
/// A trailing terminator yields a final empty segment, so `"abc."` counts as
/// two segments. Never returns zero.
pub fn sentence_count(text: &str) -> usize {
    let mut count = 1usize;
    let mut in_terminator = false;
    for c in text.chars() {
        match c {
            '.' | '!' | '?' => {
                if !in_terminator {
                    count += 1;
                    in_terminator = true;
                }
            }
            _ => in_terminator = false,
        }
    }
    count
}

/// Truncate to at most `max` characters, respecting char boundaries.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
