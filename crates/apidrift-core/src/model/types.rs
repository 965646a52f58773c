//! Structured type model recovered from type hints and docstrings.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const INFINITY: &str = "Infinity";
pub const NEGATIVE_INFINITY: &str = "NegativeInfinity";

// ---------------------------------------------------------------------------
// Inclusive codes shared with the annotation model
// ---------------------------------------------------------------------------

/// Three-way limit classification used by boundary annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum InclusiveCode {
    Inclusive = 0,
    Exclusive = 1,
    Unbounded = 2,
}

impl From<InclusiveCode> for u8 {
    fn from(code: InclusiveCode) -> u8 {
        code as u8
    }
}

impl TryFrom<u8> for InclusiveCode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(InclusiveCode::Inclusive),
            1 => Ok(InclusiveCode::Exclusive),
            2 => Ok(InclusiveCode::Unbounded),
            other => Err(format!("invalid limit type code {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Boundary endpoints
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseType {
    Int,
    Float,
}

impl BaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseType::Int => "int",
            BaseType::Float => "float",
        }
    }
}

/// One side of a numeric range.
#[derive(Debug, Clone, Copy)]
pub enum Endpoint {
    Unbounded,
    Inclusive(f64),
    Exclusive(f64),
}

impl Endpoint {
    /// Numeric value of the limit; unbounded endpoints report the placeholder `0`.
    pub fn value(&self) -> f64 {
        match self {
            Endpoint::Unbounded => 0.0,
            Endpoint::Inclusive(v) | Endpoint::Exclusive(v) => *v,
        }
    }

    pub fn code(&self) -> InclusiveCode {
        match self {
            Endpoint::Unbounded => InclusiveCode::Unbounded,
            Endpoint::Inclusive(_) => InclusiveCode::Inclusive,
            Endpoint::Exclusive(_) => InclusiveCode::Exclusive,
        }
    }

    pub fn is_inclusive(&self) -> bool {
        matches!(self, Endpoint::Inclusive(_))
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Endpoint::Unbounded)
    }

    pub fn from_code(code: InclusiveCode, value: f64) -> Self {
        match code {
            InclusiveCode::Inclusive => Endpoint::Inclusive(value),
            InclusiveCode::Exclusive => Endpoint::Exclusive(value),
            InclusiveCode::Unbounded => Endpoint::Unbounded,
        }
    }

    fn rank(&self) -> u8 {
        self.code() as u8
    }
}

impl Ord for Endpoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank()
            .cmp(&other.rank())
            .then_with(|| self.value().total_cmp(&other.value()))
    }
}

impl PartialOrd for Endpoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Endpoint {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Endpoint {}

// ---------------------------------------------------------------------------
// Type variants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NamedType {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnumType {
    pub values: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "BoundaryRepr", try_from = "BoundaryRepr")]
pub struct BoundaryType {
    pub base_type: BaseType,
    pub min: Endpoint,
    pub max: Endpoint,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnionType {
    pub types: BTreeSet<Type>,
}

/// A parameter, attribute, or result type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Type {
    #[serde(rename = "NamedType")]
    Named(NamedType),
    #[serde(rename = "EnumType")]
    Enum(EnumType),
    #[serde(rename = "BoundaryType")]
    Boundary(BoundaryType),
    #[serde(rename = "UnionType")]
    Union(UnionType),
}

/// Variant family of a type, ignoring payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFamily {
    Named,
    Enum,
    Boundary,
    Union,
}

impl Type {
    pub fn named(name: impl Into<String>) -> Self {
        Type::Named(NamedType { name: name.into() })
    }

    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Type::Enum(EnumType {
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    /// Build a flattened union. Nested unions are spliced in, duplicates
    /// removed, and a single remaining member is returned unwrapped.
    pub fn union<I>(members: I) -> Option<Type>
    where
        I: IntoIterator<Item = Type>,
    {
        let mut flat = BTreeSet::new();
        for member in members {
            match member {
                Type::Union(inner) => flat.extend(inner.types),
                other => {
                    flat.insert(other);
                }
            }
        }
        match flat.len() {
            0 => None,
            1 => flat.into_iter().next(),
            _ => Some(Type::Union(UnionType { types: flat })),
        }
    }

    pub fn family(&self) -> TypeFamily {
        match self {
            Type::Named(_) => TypeFamily::Named,
            Type::Enum(_) => TypeFamily::Enum,
            Type::Boundary(_) => TypeFamily::Boundary,
            Type::Union(_) => TypeFamily::Union,
        }
    }

    /// Members of the type when viewed as a set: a union yields its members,
    /// anything else yields itself.
    pub fn members(&self) -> Vec<&Type> {
        match self {
            Type::Union(union) => union.types.iter().collect(),
            other => vec![other],
        }
    }

    /// True when the type, or any union member, belongs to `family`.
    pub fn contains_family(&self, family: TypeFamily) -> bool {
        self.members().iter().any(|m| m.family() == family)
    }

    pub fn boundary(&self) -> Option<&BoundaryType> {
        self.members().into_iter().find_map(|m| match m {
            Type::Boundary(b) => Some(b),
            _ => None,
        })
    }

    pub fn enum_type(&self) -> Option<&EnumType> {
        self.members().into_iter().find_map(|m| match m {
            Type::Enum(e) => Some(e),
            _ => None,
        })
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Named(named) => write!(f, "{}", named.name),
            Type::Enum(enum_type) => {
                let values: Vec<String> =
                    enum_type.values.iter().map(|v| format!("{v:?}")).collect();
                write!(f, "{{{}}}", values.join(", "))
            }
            Type::Boundary(boundary) => write!(f, "{boundary}"),
            Type::Union(union) => {
                let parts: Vec<String> = union.types.iter().map(|t| t.to_string()).collect();
                write!(f, "{}", parts.join(" or "))
            }
        }
    }
}

impl fmt::Display for BoundaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (open, low) = match self.min {
            Endpoint::Unbounded => ('(', "-inf".to_string()),
            Endpoint::Inclusive(v) => ('[', v.to_string()),
            Endpoint::Exclusive(v) => ('(', v.to_string()),
        };
        let (close, high) = match self.max {
            Endpoint::Unbounded => (')', "inf".to_string()),
            Endpoint::Inclusive(v) => (']', v.to_string()),
            Endpoint::Exclusive(v) => (')', v.to_string()),
        };
        write!(f, "{} in {open}{low}, {high}{close}", self.base_type.as_str())
    }
}

// ---------------------------------------------------------------------------
// Boundary wire representation
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum LimitRepr {
    Number(f64),
    Symbol(String),
}

#[derive(Serialize, Deserialize)]
struct BoundaryRepr {
    base_type: BaseType,
    min: LimitRepr,
    max: LimitRepr,
    min_inclusive: bool,
    max_inclusive: bool,
}

fn limit_repr(endpoint: Endpoint, unbounded_symbol: &str) -> LimitRepr {
    match endpoint {
        Endpoint::Unbounded => LimitRepr::Symbol(unbounded_symbol.to_string()),
        Endpoint::Inclusive(v) | Endpoint::Exclusive(v) => LimitRepr::Number(v),
    }
}

fn endpoint_from_repr(limit: LimitRepr, inclusive: bool, unbounded_symbol: &str) -> Result<Endpoint, String> {
    match limit {
        LimitRepr::Number(v) if inclusive => Ok(Endpoint::Inclusive(v)),
        LimitRepr::Number(v) => Ok(Endpoint::Exclusive(v)),
        LimitRepr::Symbol(s) if s == unbounded_symbol => Ok(Endpoint::Unbounded),
        LimitRepr::Symbol(s) => Err(format!("unexpected boundary limit {s:?}")),
    }
}

impl From<BoundaryType> for BoundaryRepr {
    fn from(b: BoundaryType) -> Self {
        BoundaryRepr {
            base_type: b.base_type,
            min: limit_repr(b.min, NEGATIVE_INFINITY),
            max: limit_repr(b.max, INFINITY),
            min_inclusive: b.min.is_inclusive(),
            max_inclusive: b.max.is_inclusive(),
        }
    }
}

impl TryFrom<BoundaryRepr> for BoundaryType {
    type Error = String;

    fn try_from(repr: BoundaryRepr) -> Result<Self, Self::Error> {
        Ok(BoundaryType {
            base_type: repr.base_type,
            min: endpoint_from_repr(repr.min, repr.min_inclusive, NEGATIVE_INFINITY)?,
            max: endpoint_from_repr(repr.max, repr.max_inclusive, INFINITY)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_equality_is_order_independent() {
        let a = Type::enumeration(["spectral", "frobenius"]);
        let b = Type::enumeration(["frobenius", "spectral", "frobenius"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_union_flattens_and_collapses() {
        let inner = Type::union([Type::named("int"), Type::named("str")]).unwrap();
        let outer = Type::union([inner, Type::named("int")]).unwrap();
        match &outer {
            Type::Union(u) => assert_eq!(u.types.len(), 2),
            other => panic!("expected union, got {other:?}"),
        }
        assert_eq!(
            Type::union([Type::named("int"), Type::named("int")]),
            Some(Type::named("int"))
        );
        assert_eq!(Type::union(Vec::new()), None);
    }

    #[test]
    fn test_different_variants_never_equal() {
        assert_ne!(Type::named("a"), Type::enumeration(["a"]));
    }

    #[test]
    fn test_endpoint_codes_and_placeholder() {
        assert_eq!(Endpoint::Unbounded.code(), InclusiveCode::Unbounded);
        assert_eq!(Endpoint::Unbounded.value(), 0.0);
        assert_eq!(Endpoint::Exclusive(-1.0).code(), InclusiveCode::Exclusive);
        assert_eq!(u8::from(InclusiveCode::Exclusive), 1);
    }

    #[test]
    fn test_boundary_json_uses_infinity_symbols() {
        let boundary = Type::Boundary(BoundaryType {
            base_type: BaseType::Float,
            min: Endpoint::Inclusive(0.0),
            max: Endpoint::Unbounded,
        });
        let json = serde_json::to_value(&boundary).unwrap();
        assert_eq!(json["kind"], "BoundaryType");
        assert_eq!(json["max"], "Infinity");
        assert_eq!(json["min_inclusive"], true);
        let back: Type = serde_json::from_value(json).unwrap();
        assert_eq!(back, boundary);
    }

    #[test]
    fn test_contains_family_looks_into_unions() {
        let t = Type::union([
            Type::named("float"),
            Type::Boundary(BoundaryType {
                base_type: BaseType::Float,
                min: Endpoint::Unbounded,
                max: Endpoint::Exclusive(1.0),
            }),
        ])
        .unwrap();
        assert!(t.contains_family(TypeFamily::Boundary));
        assert!(!t.contains_family(TypeFamily::Enum));
        assert!(t.boundary().is_some());
    }

    #[test]
    fn test_display_boundary() {
        let b = BoundaryType {
            base_type: BaseType::Int,
            min: Endpoint::Exclusive(-1.0),
            max: Endpoint::Inclusive(5.0),
        };
        assert_eq!(b.to_string(), "int in (-1, 5]");
    }
}
