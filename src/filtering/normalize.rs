//! Text normalization.
//!
//! Turns a comment body into a single line of space-separated word tokens.
use itertools::Itertools;
use unicode_segmentation::UnicodeSegmentation;

/// HTML entities left escaped in dumps, and their spaced replacement.
const HTML_PAIRS: [(&str, &str); 5] = [
    ("&amp;", " & "),
    ("&quot", " \" "),
    ("&apos", " ' "),
    ("&gt;", " > "),
    ("&lt;", " < "),
];

/// Word tokens of `text`, following unicode word boundaries.
///
/// Punctuation is kept as separate tokens, whitespace is dropped.
pub fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split_word_bounds()
        .filter(|token| !token.trim().is_empty())
}

/// Normalize a comment body.
///
/// Entities are unescaped, newlines and angle brackets are turned into spaces,
/// then tokens are joined with a single space.
pub fn normalize(body: &str) -> String {
    let mut text = body.to_string();
    for (entity, replacement) in HTML_PAIRS.iter() {
        text = text.replace(entity, replacement);
    }
    let text = text.replace(['\n', '\r', '<', '>'], " ");

    let normalized = tokens(text.trim()).join(" ");
    normalized
}
