//! Numeric range extraction from docstring descriptions.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::model::types::{BaseType, BoundaryType, Endpoint};

const NUMBER: &str = r"[-+]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][-+]?\d+)?";
const LOWER_INFINITY: &str = r"-inf(?:inity)?|negative_?infinity";
const UPPER_INFINITY: &str = r"\+?inf(?:inity)?";

fn range_body() -> String {
    format!(
        r"`?(?P<open>[\[(])\s*(?P<min>{NUMBER}|{LOWER_INFINITY})\s*,\s*(?P<max>{NUMBER}|{UPPER_INFINITY})\s*(?P<close>[\])])`?"
    )
}

// "in the range [0, 1]", "of interval (0, inf)", ...
static PHRASED_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:range|interval)\s+(?:of\s+)?{}",
        range_body()
    ))
    .unwrap()
});

static BARE_RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i){}", range_body())).unwrap());

// A whole type-text segment such as "[0, 1]" or "float in (0, 1]".
static SEGMENT_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^\s*(?:(?P<base>int|float)\s+(?:in\s+)?)?{}\s*$",
        range_body()
    ))
    .unwrap()
});

fn parse_limit(token: &str, bracket: char, lower: bool) -> Option<Endpoint> {
    let lowered = token.to_ascii_lowercase();
    if lowered.contains("inf") {
        return Some(Endpoint::Unbounded);
    }
    let value: f64 = token.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let inclusive = if lower { bracket == '[' } else { bracket == ']' };
    Some(if inclusive {
        Endpoint::Inclusive(value)
    } else {
        Endpoint::Exclusive(value)
    })
}

fn from_captures(caps: &Captures<'_>, base_type: BaseType) -> Option<BoundaryType> {
    let open = caps.name("open")?.as_str().chars().next()?;
    let close = caps.name("close")?.as_str().chars().next()?;
    let min = parse_limit(caps.name("min")?.as_str(), open, true)?;
    let max = parse_limit(caps.name("max")?.as_str(), close, false)?;
    if !min.is_unbounded() && !max.is_unbounded() && min.value() > max.value() {
        return None;
    }
    Some(BoundaryType {
        base_type,
        min,
        max,
    })
}

impl BoundaryType {
    /// Find a numeric range in free description text.
    ///
    /// Ranges introduced by "range"/"interval" phrasing are preferred over a
    /// bare bracketed pair, which is only used when no phrased range exists.
    pub fn from_text(description: &str, base_type: BaseType) -> Option<BoundaryType> {
        PHRASED_RANGE_RE
            .captures_iter(description)
            .chain(BARE_RANGE_RE.captures_iter(description))
            .find_map(|caps| from_captures(&caps, base_type))
    }

    /// Interpret a whole type-text segment as a range, e.g. `int in [0, 10]`.
    /// An explicit base type in the segment overrides `declared`.
    pub fn from_segment(segment: &str, declared: BaseType) -> Option<BoundaryType> {
        let caps = SEGMENT_RANGE_RE.captures(segment)?;
        let base_type = match caps.name("base").map(|m| m.as_str().to_ascii_lowercase()) {
            Some(b) if b == "int" => BaseType::Int,
            Some(_) => BaseType::Float,
            None => declared,
        };
        from_captures(&caps, base_type)
    }
}
