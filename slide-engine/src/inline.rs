//! Inline span scanner.
//!
//! Splits a line of text into words tagged with the span they came from.
//! Only the simple markers are recognised: `**bold**`, `__bold__`,
//! `*italic*`, `_italic_`, `` `code` `` and `[text](url)`. Spans do not nest;
//! the markers themselves are dropped.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

// Alternation order matters: double markers must win over single ones.
static SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\*\*(?P<bold_star>.+?)\*\*|__(?P<bold_under>.+?)__|\[(?P<link>[^\]]+)\]\([^)]*\)|`(?P<code>[^`]+)`|\*(?P<italic_star>[^*\s][^*]*)\*|_(?P<italic_under>[^_\s][^_]*)_",
    )
    .unwrap()
});

/// How a word should be styled when drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanStyle {
    Normal,
    Bold,
    Italic,
    Link,
    Code,
}

/// Split `text` into `(word, style)` pairs in reading order.
///
/// Words are whitespace-separated and carry no surrounding spaces.
pub fn parse_formatted_words(text: &str) -> Vec<(String, SpanStyle)> {
    let mut words = Vec::new();
    let mut last = 0;

    for caps in SPAN.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_words(&mut words, &text[last..whole.start()], SpanStyle::Normal);
        let (inner, style) = span_of(&caps);
        push_words(&mut words, inner, style);
        last = whole.end();
    }
    push_words(&mut words, &text[last..], SpanStyle::Normal);

    words
}

fn span_of<'t>(caps: &Captures<'t>) -> (&'t str, SpanStyle) {
    const GROUPS: [(&str, SpanStyle); 6] = [
        ("bold_star", SpanStyle::Bold),
        ("bold_under", SpanStyle::Bold),
        ("link", SpanStyle::Link),
        ("code", SpanStyle::Code),
        ("italic_star", SpanStyle::Italic),
        ("italic_under", SpanStyle::Italic),
    ];

    GROUPS
        .into_iter()
        .find_map(|(name, style)| caps.name(name).map(|m| (m.as_str(), style)))
        .unwrap_or(("", SpanStyle::Normal))
}

fn push_words(out: &mut Vec<(String, SpanStyle)>, text: &str, style: SpanStyle) {
    out.extend(text.split_whitespace().map(|word| (word.to_string(), style)));
}
