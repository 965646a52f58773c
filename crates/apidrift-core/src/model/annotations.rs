//! Annotation model: metadata attached to API elements by identity.
//!
//! Every variant embeds the same [`AnnotationHeader`]; payload fields are
//! per kind. Field names follow the persisted store format (camelCase).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::types::{BoundaryType, InclusiveCode};

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewResult {
    #[default]
    #[serde(rename = "")]
    None,
    Unsure,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationHeader {
    pub target: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub reviewers: Vec<String>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub review_result: ReviewResult,
}

impl AnnotationHeader {
    pub fn new(target: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            authors: vec![author.into()],
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

/// Default value carried by `Constant` and `Optional` annotations.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    String(String),
    Number(f64),
    Boolean(bool),
    None,
}

impl DefaultValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            DefaultValue::String(_) => "string",
            DefaultValue::Number(_) => "number",
            DefaultValue::Boolean(_) => "boolean",
            DefaultValue::None => "none",
        }
    }

    /// Classify a literal as it appears at a call site.
    pub fn from_literal(literal: &str) -> Self {
        let trimmed = literal.trim();
        match trimmed {
            "None" | "null" => return DefaultValue::None,
            "True" | "true" => return DefaultValue::Boolean(true),
            "False" | "false" => return DefaultValue::Boolean(false),
            _ => {}
        }
        if let Ok(number) = trimmed.parse::<f64>() {
            if number.is_finite() {
                return DefaultValue::Number(number);
            }
        }
        let unquoted = trimmed
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .or_else(|| trimmed.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
            .unwrap_or(trimmed);
        DefaultValue::String(unquoted.to_string())
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::String(s) => write!(f, "{s:?}"),
            DefaultValue::Number(n) => write!(f, "{n}"),
            DefaultValue::Boolean(b) => write!(f, "{b}"),
            DefaultValue::None => write!(f, "None"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DefaultValueRepr {
    default_type: String,
    #[serde(default)]
    default_value: serde_json::Value,
}

impl Serialize for DefaultValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let default_value = match self {
            DefaultValue::String(s) => serde_json::Value::from(s.clone()),
            DefaultValue::Number(n) => serde_json::Value::from(*n),
            DefaultValue::Boolean(b) => serde_json::Value::from(*b),
            DefaultValue::None => serde_json::Value::Null,
        };
        DefaultValueRepr {
            default_type: self.type_name().to_string(),
            default_value,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DefaultValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let repr = DefaultValueRepr::deserialize(deserializer)?;
        match (repr.default_type.as_str(), repr.default_value) {
            ("string", serde_json::Value::String(s)) => Ok(DefaultValue::String(s)),
            ("number", serde_json::Value::Number(n)) => n
                .as_f64()
                .map(DefaultValue::Number)
                .ok_or_else(|| D::Error::custom("defaultValue is not a finite number")),
            ("boolean", serde_json::Value::Bool(b)) => Ok(DefaultValue::Boolean(b)),
            ("none", _) => Ok(DefaultValue::None),
            (kind, value) => Err(D::Error::custom(format!(
                "defaultValue {value} does not match defaultType {kind:?}"
            ))),
        }
    }
}

/// Numeric interval carried by `Boundary` annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interval {
    pub is_discrete: bool,
    pub lower_interval_limit: f64,
    pub lower_limit_type: InclusiveCode,
    pub upper_interval_limit: f64,
    pub upper_limit_type: InclusiveCode,
}

impl Interval {
    pub fn from_boundary(boundary: &BoundaryType) -> Self {
        Self {
            is_discrete: matches!(boundary.base_type, crate::model::types::BaseType::Int),
            lower_interval_limit: boundary.min.value(),
            lower_limit_type: boundary.min.code(),
            upper_interval_limit: boundary.max.value(),
            upper_limit_type: boundary.max.code(),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lower = match self.lower_limit_type {
            InclusiveCode::Inclusive => format!("[{}", self.lower_interval_limit),
            InclusiveCode::Exclusive => format!("({}", self.lower_interval_limit),
            InclusiveCode::Unbounded => "(-inf".to_string(),
        };
        let upper = match self.upper_limit_type {
            InclusiveCode::Inclusive => format!("{}]", self.upper_interval_limit),
            InclusiveCode::Exclusive => format!("{})", self.upper_interval_limit),
            InclusiveCode::Unbounded => "inf)".to_string(),
        };
        let kind = if self.is_discrete { "discrete" } else { "continuous" };
        write!(f, "{kind} {lower}, {upper}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumPair {
    pub string_value: String,
    pub instance_name: String,
}

// ---------------------------------------------------------------------------
// Annotation variants
// ---------------------------------------------------------------------------

/// Discriminant of [`Annotation`], in store order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnnotationKind {
    Remove,
    Required,
    Optional,
    Constant,
    Boundary,
    Enum,
    Move,
    Rename,
    Description,
    Todo,
    Group,
    CalledAfter,
    Expert,
}

impl AnnotationKind {
    pub const ALL: [AnnotationKind; 13] = [
        AnnotationKind::Remove,
        AnnotationKind::Required,
        AnnotationKind::Optional,
        AnnotationKind::Constant,
        AnnotationKind::Boundary,
        AnnotationKind::Enum,
        AnnotationKind::Move,
        AnnotationKind::Rename,
        AnnotationKind::Description,
        AnnotationKind::Todo,
        AnnotationKind::Group,
        AnnotationKind::CalledAfter,
        AnnotationKind::Expert,
    ];

    /// Display name as used in annotation tags, e.g. `CalledAfter`.
    pub fn name(&self) -> &'static str {
        match self {
            AnnotationKind::Remove => "Remove",
            AnnotationKind::Required => "Required",
            AnnotationKind::Optional => "Optional",
            AnnotationKind::Constant => "Constant",
            AnnotationKind::Boundary => "Boundary",
            AnnotationKind::Enum => "Enum",
            AnnotationKind::Move => "Move",
            AnnotationKind::Rename => "Rename",
            AnnotationKind::Description => "Description",
            AnnotationKind::Todo => "Todo",
            AnnotationKind::Group => "Group",
            AnnotationKind::CalledAfter => "CalledAfter",
            AnnotationKind::Expert => "Expert",
        }
    }

    /// Key of this kind in the persisted store, e.g. `calledAfterAnnotations`.
    pub fn store_key(&self) -> &'static str {
        match self {
            AnnotationKind::Remove => "removeAnnotations",
            AnnotationKind::Required => "requiredAnnotations",
            AnnotationKind::Optional => "optionalAnnotations",
            AnnotationKind::Constant => "constantAnnotations",
            AnnotationKind::Boundary => "boundaryAnnotations",
            AnnotationKind::Enum => "enumAnnotations",
            AnnotationKind::Move => "moveAnnotations",
            AnnotationKind::Rename => "renameAnnotations",
            AnnotationKind::Description => "descriptionAnnotations",
            AnnotationKind::Todo => "todoAnnotations",
            AnnotationKind::Group => "groupAnnotations",
            AnnotationKind::CalledAfter => "calledAfterAnnotations",
            AnnotationKind::Expert => "expertAnnotations",
        }
    }

    pub fn from_store_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.store_key() == key)
    }

    /// Kinds that describe how a parameter's value is supplied; at most one
    /// of them may hold per target.
    fn is_value_kind(&self) -> bool {
        matches!(
            self,
            AnnotationKind::Remove
                | AnnotationKind::Required
                | AnnotationKind::Optional
                | AnnotationKind::Constant
        )
    }

    /// Whether two annotations of these kinds on the same target exclude
    /// each other.
    pub fn conflicts_with(&self, other: AnnotationKind) -> bool {
        *self == other || (self.is_value_kind() && other.is_value_kind())
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One annotation. Each variant embeds the common header.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Remove {
        header: AnnotationHeader,
    },
    Required {
        header: AnnotationHeader,
    },
    Optional {
        header: AnnotationHeader,
        default: DefaultValue,
    },
    Constant {
        header: AnnotationHeader,
        default: DefaultValue,
    },
    Boundary {
        header: AnnotationHeader,
        interval: Interval,
    },
    Enum {
        header: AnnotationHeader,
        enum_name: String,
        pairs: Vec<EnumPair>,
    },
    Move {
        header: AnnotationHeader,
        destination: String,
    },
    Rename {
        header: AnnotationHeader,
        new_name: String,
    },
    Description {
        header: AnnotationHeader,
        new_description: String,
    },
    Todo {
        header: AnnotationHeader,
        new_todo: String,
    },
    Group {
        header: AnnotationHeader,
        group_name: String,
        parameters: Vec<String>,
    },
    CalledAfter {
        header: AnnotationHeader,
        called_after_name: String,
    },
    Expert {
        header: AnnotationHeader,
    },
}

impl Annotation {
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Annotation::Remove { .. } => AnnotationKind::Remove,
            Annotation::Required { .. } => AnnotationKind::Required,
            Annotation::Optional { .. } => AnnotationKind::Optional,
            Annotation::Constant { .. } => AnnotationKind::Constant,
            Annotation::Boundary { .. } => AnnotationKind::Boundary,
            Annotation::Enum { .. } => AnnotationKind::Enum,
            Annotation::Move { .. } => AnnotationKind::Move,
            Annotation::Rename { .. } => AnnotationKind::Rename,
            Annotation::Description { .. } => AnnotationKind::Description,
            Annotation::Todo { .. } => AnnotationKind::Todo,
            Annotation::Group { .. } => AnnotationKind::Group,
            Annotation::CalledAfter { .. } => AnnotationKind::CalledAfter,
            Annotation::Expert { .. } => AnnotationKind::Expert,
        }
    }

    pub fn header(&self) -> &AnnotationHeader {
        match self {
            Annotation::Remove { header }
            | Annotation::Required { header }
            | Annotation::Optional { header, .. }
            | Annotation::Constant { header, .. }
            | Annotation::Boundary { header, .. }
            | Annotation::Enum { header, .. }
            | Annotation::Move { header, .. }
            | Annotation::Rename { header, .. }
            | Annotation::Description { header, .. }
            | Annotation::Todo { header, .. }
            | Annotation::Group { header, .. }
            | Annotation::CalledAfter { header, .. }
            | Annotation::Expert { header } => header,
        }
    }

    fn header_mut(&mut self) -> &mut AnnotationHeader {
        match self {
            Annotation::Remove { header }
            | Annotation::Required { header }
            | Annotation::Optional { header, .. }
            | Annotation::Constant { header, .. }
            | Annotation::Boundary { header, .. }
            | Annotation::Enum { header, .. }
            | Annotation::Move { header, .. }
            | Annotation::Rename { header, .. }
            | Annotation::Description { header, .. }
            | Annotation::Todo { header, .. }
            | Annotation::Group { header, .. }
            | Annotation::CalledAfter { header, .. }
            | Annotation::Expert { header } => header,
        }
    }

    pub fn target(&self) -> &str {
        &self.header().target
    }

    pub fn review_result(&self) -> ReviewResult {
        self.header().review_result
    }

    /// Copy of this annotation re-targeted to `new_target`, with `author`
    /// appended to the author list. The payload is untouched.
    pub fn migrated(&self, new_target: &str, author: &str) -> Annotation {
        let mut copy = self.clone();
        let header = copy.header_mut();
        header.target = new_target.to_string();
        header.authors.push(author.to_string());
        copy
    }

    /// Mark as needing review, with an explanatory comment.
    pub fn mark_unsure(&mut self, comment: String) {
        let header = self.header_mut();
        header.review_result = ReviewResult::Unsure;
        header.comment = comment;
    }

    /// Short human-readable rendering of the payload, used in review notes.
    pub fn describe(&self) -> String {
        match self {
            Annotation::Remove { .. }
            | Annotation::Required { .. }
            | Annotation::Expert { .. } => format!("@{}", self.kind()),
            Annotation::Optional { default, .. } | Annotation::Constant { default, .. } => {
                format!("@{} with the default value {default}", self.kind())
            }
            Annotation::Boundary { interval, .. } => {
                format!("@Boundary with the interval {interval}")
            }
            Annotation::Enum {
                enum_name, pairs, ..
            } => {
                let pairs: Vec<String> = pairs
                    .iter()
                    .map(|p| format!("{}={:?}", p.instance_name, p.string_value))
                    .collect();
                format!("@Enum {enum_name} ({})", pairs.join(", "))
            }
            Annotation::Move { destination, .. } => {
                format!("@Move with the destination {destination:?}")
            }
            Annotation::Rename { new_name, .. } => {
                format!("@Rename with the new name {new_name:?}")
            }
            Annotation::Description {
                new_description, ..
            } => format!("@Description {new_description:?}"),
            Annotation::Todo { new_todo, .. } => format!("@Todo {new_todo:?}"),
            Annotation::Group {
                group_name,
                parameters,
                ..
            } => format!("@Group {group_name} ({})", parameters.join(", ")),
            Annotation::CalledAfter {
                called_after_name, ..
            } => format!("@CalledAfter {called_after_name:?}"),
        }
    }

    // -- JSON payload (header fields flattened next to kind fields) ----------

    /// Fields of this annotation as stored under its target in the store.
    pub fn to_fields(&self) -> serde_json::Result<serde_json::Value> {
        let mut value = serde_json::to_value(self.header())?;
        let extra = match self {
            Annotation::Remove { .. }
            | Annotation::Required { .. }
            | Annotation::Expert { .. } => serde_json::json!({}),
            Annotation::Optional { default, .. } | Annotation::Constant { default, .. } => {
                serde_json::to_value(default)?
            }
            Annotation::Boundary { interval, .. } => serde_json::json!({ "interval": interval }),
            Annotation::Enum {
                enum_name, pairs, ..
            } => serde_json::json!({ "enumName": enum_name, "pairs": pairs }),
            Annotation::Move { destination, .. } => {
                serde_json::json!({ "destination": destination })
            }
            Annotation::Rename { new_name, .. } => serde_json::json!({ "newName": new_name }),
            Annotation::Description {
                new_description, ..
            } => serde_json::json!({ "newDescription": new_description }),
            Annotation::Todo { new_todo, .. } => serde_json::json!({ "newTodo": new_todo }),
            Annotation::Group {
                group_name,
                parameters,
                ..
            } => serde_json::json!({ "groupName": group_name, "parameters": parameters }),
            Annotation::CalledAfter {
                called_after_name, ..
            } => serde_json::json!({ "calledAfterName": called_after_name }),
        };
        if let (Some(target), serde_json::Value::Object(extra)) = (value.as_object_mut(), extra) {
            target.extend(extra);
        }
        Ok(value)
    }

    /// Rebuild an annotation of `kind` from its stored fields.
    pub fn from_fields(kind: AnnotationKind, fields: serde_json::Value) -> serde_json::Result<Self> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct IntervalFields {
            interval: Interval,
        }
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct EnumFields {
            enum_name: String,
            #[serde(default)]
            pairs: Vec<EnumPair>,
        }
        #[derive(Deserialize)]
        struct MoveFields {
            destination: String,
        }
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct RenameFields {
            new_name: String,
        }
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct DescriptionFields {
            new_description: String,
        }
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct TodoFields {
            new_todo: String,
        }
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct GroupFields {
            group_name: String,
            #[serde(default)]
            parameters: Vec<String>,
        }
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct CalledAfterFields {
            called_after_name: String,
        }

        let header: AnnotationHeader = serde_json::from_value(fields.clone())?;
        let annotation = match kind {
            AnnotationKind::Remove => Annotation::Remove { header },
            AnnotationKind::Required => Annotation::Required { header },
            AnnotationKind::Expert => Annotation::Expert { header },
            AnnotationKind::Optional => Annotation::Optional {
                header,
                default: serde_json::from_value(fields)?,
            },
            AnnotationKind::Constant => Annotation::Constant {
                header,
                default: serde_json::from_value(fields)?,
            },
            AnnotationKind::Boundary => {
                let f: IntervalFields = serde_json::from_value(fields)?;
                Annotation::Boundary {
                    header,
                    interval: f.interval,
                }
            }
            AnnotationKind::Enum => {
                let f: EnumFields = serde_json::from_value(fields)?;
                Annotation::Enum {
                    header,
                    enum_name: f.enum_name,
                    pairs: f.pairs,
                }
            }
            AnnotationKind::Move => {
                let f: MoveFields = serde_json::from_value(fields)?;
                Annotation::Move {
                    header,
                    destination: f.destination,
                }
            }
            AnnotationKind::Rename => {
                let f: RenameFields = serde_json::from_value(fields)?;
                Annotation::Rename {
                    header,
                    new_name: f.new_name,
                }
            }
            AnnotationKind::Description => {
                let f: DescriptionFields = serde_json::from_value(fields)?;
                Annotation::Description {
                    header,
                    new_description: f.new_description,
                }
            }
            AnnotationKind::Todo => {
                let f: TodoFields = serde_json::from_value(fields)?;
                Annotation::Todo {
                    header,
                    new_todo: f.new_todo,
                }
            }
            AnnotationKind::Group => {
                let f: GroupFields = serde_json::from_value(fields)?;
                Annotation::Group {
                    header,
                    group_name: f.group_name,
                    parameters: f.parameters,
                }
            }
            AnnotationKind::CalledAfter => {
                let f: CalledAfterFields = serde_json::from_value(fields)?;
                Annotation::CalledAfter {
                    header,
                    called_after_name: f.called_after_name,
                }
            }
        };
        Ok(annotation)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
