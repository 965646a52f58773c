//! Docstring type parser: informal type descriptions to [`Type`] values.
//!
//! `parse_type` is total. Anything it cannot make sense of yields `None`
//! rather than an error.

pub mod boundary;
pub mod enums;

use std::sync::LazyLock;

use regex::Regex;

use crate::model::types::{BaseType, BoundaryType, EnumType, Type};

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

// numpydoc "int, default=1" / "float, default: 0.5" / "str default 'auto'"
static DEFAULT_CLAUSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|,|\s)\s*default\b.*$").unwrap());

/// Split type text on top-level `" or "` and `","` separators.
///
/// Separators nested in `()`, `[]`, `{}` or inside a quoted string are not
/// split points. Empty segments are dropped.
pub fn split_type_text(text: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0usize;
    let mut chars = text.char_indices().peekable();

    while let Some((index, c)) = chars.next() {
        if let Some(open) = quote {
            if c == open && !text[..index].ends_with('\\') {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                segments.push(text[start..index].to_string());
                start = index + 1;
            }
            ' ' if depth == 0 && text[index..].starts_with(" or ") => {
                segments.push(text[start..index].to_string());
                start = index + " or ".len();
                // skip the remaining "or " of the separator
                for _ in 0..3 {
                    chars.next();
                }
            }
            _ => {}
        }
    }
    segments.push(text[start..].to_string());

    segments
        .into_iter()
        .map(|s| clean_segment(&s))
        .filter(|s| !s.is_empty())
        .collect()
}

fn clean_segment(segment: &str) -> String {
    segment.trim().trim_matches('`').trim().to_string()
}

fn is_optional_marker(segment: &str) -> bool {
    segment.eq_ignore_ascii_case("optional")
}

/// `Int` iff the declared type names `int` and never `float`.
fn declared_base_type(segments: &[String]) -> BaseType {
    let names_int = segments.iter().any(|s| s.eq_ignore_ascii_case("int"));
    let names_float = segments.iter().any(|s| s.eq_ignore_ascii_case("float"));
    if names_int && !names_float {
        BaseType::Int
    } else {
        BaseType::Float
    }
}

/// Parse a docstring's type text, using its description to pick up a
/// numeric range.
///
/// Returns `None` for empty or unusable input. A single recognised member is
/// returned as is; several become a flattened [`Type::Union`].
pub fn parse_type(type_text: &str, description: &str) -> Option<Type> {
    let collapsed = WHITESPACE_RE.replace_all(type_text.trim(), " ");
    if collapsed.is_empty() {
        return None;
    }
    let mut remaining = DEFAULT_CLAUSE_RE.replace(&collapsed, "").into_owned();

    let mut members = Vec::new();

    if let Some(span) = enums::first_brace_span(&remaining) {
        if let Some(enum_type) = EnumType::from_text(&remaining[span.clone()]) {
            if !enum_type.values.is_empty() {
                members.push(Type::Enum(enum_type));
            }
        }
        remaining.replace_range(span, "");
    }

    let segments = split_type_text(&remaining);
    let base_type = declared_base_type(&segments);

    if let Some(boundary) = BoundaryType::from_text(description, base_type) {
        members.push(Type::Boundary(boundary));
    }

    for segment in &segments {
        if is_optional_marker(segment) {
            continue;
        }
        if let Some(boundary) = BoundaryType::from_segment(segment, base_type) {
            members.push(Type::Boundary(boundary));
        } else if segment.starts_with('{') {
            if let Some(enum_type) = EnumType::from_text(segment) {
                if !enum_type.values.is_empty() {
                    members.push(Type::Enum(enum_type));
                }
            }
        } else {
            members.push(Type::named(segment.as_str()));
        }
    }

    Type::union(members)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
