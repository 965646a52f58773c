//! Enumeration extraction from `{...}` spans in type text.

use std::collections::BTreeSet;
use std::ops::Range;

use crate::model::types::EnumType;

/// Byte range of the first balanced `{...}` span, braces included.
///
/// Braces inside quoted values do not count. If a quote never closes, the
/// braces are matched without regard to quotes.
pub fn first_brace_span(text: &str) -> Option<Range<usize>> {
    let start = text.find('{')?;
    let body = &text[start..];
    let end = balanced_end(body, true).or_else(|| balanced_end(body, false))?;
    Some(start..start + end)
}

/// Offset just past the brace closing the one at the start of `text`.
fn balanced_end(text: &str, respect_quotes: bool) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut previous: Option<char> = None;
    for (offset, c) in text.char_indices() {
        let escaped = previous == Some('\\');
        previous = Some(c);
        if let Some(open) = quote {
            if c == open && !escaped {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' if respect_quotes && !escaped => quote = Some(c),
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}

fn unescape(value: &str) -> String {
    value.replace("\\\"", "\"").replace("\\'", "'")
}

/// Collect the quoted values inside an enum body.
///
/// A value opens on an unescaped quote and closes only on an unescaped quote
/// of the same kind. A value that never closes is discarded.
fn quoted_values(body: &str) -> BTreeSet<String> {
    let mut values = BTreeSet::new();
    let mut quote: Option<char> = None;
    let mut current = String::new();
    let mut previous: Option<char> = None;

    for c in body.chars() {
        let escaped = previous == Some('\\');
        match quote {
            Some(open) => {
                if c == open && !escaped {
                    values.insert(unescape(&current));
                    current.clear();
                    quote = None;
                } else {
                    current.push(c);
                }
            }
            None => {
                if (c == '"' || c == '\'') && !escaped {
                    quote = Some(c);
                }
            }
        }
        previous = Some(c);
    }

    values
}

impl EnumType {
    /// Parse the first `{...}` span of `text`. Returns `None` when there is no
    /// balanced span; the value set may be empty.
    pub fn from_text(text: &str) -> Option<EnumType> {
        let span = first_brace_span(text)?;
        let body = &text[span.start + 1..span.end - 1];
        Some(EnumType {
            values: quoted_values(body),
        })
    }
}
