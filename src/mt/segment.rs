//! Protected-token scanning and segmentation
//!
//! Android resource values mix translatable prose with tokens that must reach
//! the translated output byte-for-byte: format specifiers (`%s`, `%1$s`),
//! escape sequences (`\n`, `\'`), Unicode escapes (`\uXXXX`), bracketed
//! groups (`[...]`) and brace placeholders (`{0}`, `{name}`).
//!
//! This module locates those tokens and splits a value into an ordered list
//! of [`Segment`]s. Only `Text` segments are ever sent to a translation
//! provider; `Placeholder` segments are carried through verbatim.
//!
//! Invariant: concatenating the segments in order reproduces the input
//! exactly, so a run with no translation applied is the identity transform.

use regex::Regex;
use std::sync::LazyLock;

/// Token shapes recognized as non-translatable, tried leftmost-first.
///
/// Kept as a declarative list rather than branching logic so new placeholder
/// conventions can be added without touching the scanner.
pub const TOKEN_PATTERNS: &[&str] = &[
    // Format specifiers, numbered (%1$s) or positional (%s, %d, %i, %f)
    r"%(?:[0-9]+\$)?[sdif]",
    // Unicode escapes
    r"\\u[0-9a-fA-F]{4}",
    // Single-character escape sequences
    r#"\\[ntrb'"]"#,
    // Bracketed groups
    r"\[[^\]]*\]",
    // Numeric brace placeholders
    r"\{[0-9]+\}",
    // Named brace placeholders
    r"\{[A-Za-z_]+\}",
];

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&TOKEN_PATTERNS.join("|")).expect("token patterns must compile"));

/// A protected substring of a source value, with its byte span.
///
/// `text` includes up to one adjacent leading and trailing space pulled into
/// the token, so translation never reflows that whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedToken {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// One span of a segmented value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Translatable prose.
    Text(String),
    /// A protected token, copied through translation unchanged.
    Placeholder(String),
}

impl Segment {
    pub fn as_str(&self) -> &str {
        match self {
            Segment::Text(s) | Segment::Placeholder(s) => s,
        }
    }
}

/// Scan a value for protected tokens, left to right.
///
/// Matches are non-overlapping with standard leftmost scan semantics. Each
/// match absorbs a single adjacent space on either side when present; a space
/// that already belongs to the previous token is never absorbed twice, so
/// adjacent tokens still reassemble to the original string.
pub fn scan_protected_tokens(text: &str) -> Vec<ProtectedToken> {
    let bytes = text.as_bytes();
    let mut tokens: Vec<ProtectedToken> = Vec::new();

    for m in TOKEN_RE.find_iter(text) {
        let mut start = m.start();
        let mut end = m.end();
        let floor = tokens.last().map(|t| t.end).unwrap_or(0);
        if start > floor && bytes[start - 1] == b' ' {
            start -= 1;
        }
        if end < bytes.len() && bytes[end] == b' ' {
            end += 1;
        }
        tokens.push(ProtectedToken {
            start,
            end,
            text: text[start..end].to_string(),
        });
    }

    tokens
}

/// Partition a value into alternating text and placeholder segments.
///
/// With no tokens the whole value is a single `Text` segment. Adjacent
/// tokens produce no empty `Text` segment between them.
pub fn segment_value(text: &str, tokens: &[ProtectedToken]) -> Vec<Segment> {
    if tokens.is_empty() {
        return vec![Segment::Text(text.to_string())];
    }

    let mut segments = Vec::new();
    let mut last_end = 0;
    for token in tokens {
        if token.start > last_end {
            segments.push(Segment::Text(text[last_end..token.start].to_string()));
        }
        segments.push(Segment::Placeholder(token.text.clone()));
        last_end = token.end;
    }
    if last_end < text.len() {
        segments.push(Segment::Text(text[last_end..].to_string()));
    }

    segments
}

/// Whether any text segment carries non-whitespace prose.
///
/// A value that is nothing but protected tokens and whitespace has no prose
/// and must never be sent to a provider.
pub fn has_translatable_prose(segments: &[Segment]) -> bool {
    segments
        .iter()
        .any(|s| matches!(s, Segment::Text(t) if !t.trim().is_empty()))
}
