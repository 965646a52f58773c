//! API entity model: one snapshot of a library's public surface.
//!
//! Entities are stored in flat, declaration-ordered maps keyed by identity.
//! Parent/child relations are kept as identities and resolved through
//! [`Api::parent_of`], so two snapshots never share references.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::docstring::parse_type;
use crate::model::types::Type;

// ---------------------------------------------------------------------------
// Element kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Class,
    Function,
    Parameter,
    Attribute,
    Result,
}

impl ElementKind {
    pub const ALL: [ElementKind; 5] = [
        ElementKind::Class,
        ElementKind::Function,
        ElementKind::Parameter,
        ElementKind::Attribute,
        ElementKind::Result,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Class => "class",
            ElementKind::Function => "function",
            ElementKind::Parameter => "parameter",
            ElementKind::Attribute => "attribute",
            ElementKind::Result => "result",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last `/`- or `.`-separated segment of an identity or qualified name.
pub fn simple_name(path: &str) -> &str {
    let after_slash = path.rsplit('/').next().unwrap_or(path);
    after_slash.rsplit('.').next().unwrap_or(after_slash)
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub id: String,
    pub qname: String,
    #[serde(default)]
    pub decorators: Vec<String>,
    #[serde(default)]
    pub superclasses: Vec<String>,
    /// Identities of the functions defined in this class.
    #[serde(default)]
    pub methods: Vec<String>,
    /// Identities of the instance attributes of this class.
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default)]
    pub reexported_by: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub full_docstring: String,
    #[serde(default)]
    pub code: String,
}

impl Class {
    pub fn name(&self) -> &str {
        simple_name(&self.qname)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub id: String,
    pub qname: String,
    #[serde(default)]
    pub decorators: Vec<String>,
    /// Ordered identities of the parameters.
    #[serde(default)]
    pub parameters: Vec<String>,
    /// Ordered identities of the results.
    #[serde(default)]
    pub results: Vec<String>,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default)]
    pub reexported_by: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub full_docstring: String,
    #[serde(default)]
    pub code: String,
}

impl Function {
    pub fn name(&self) -> &str {
        simple_name(&self.qname)
    }
}

/// How an argument is bound to a parameter at a call site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParameterAssignment {
    PositionOnly,
    #[default]
    PositionOrName,
    NameOnly,
    Implicit,
    PositionalVararg,
    NamedVararg,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterDocumentation {
    #[serde(default, rename = "type")]
    pub type_text: String,
    #[serde(default)]
    pub default_value: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: String,
    pub qname: String,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub assigned_by: ParameterAssignment,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default)]
    pub docstring: ParameterDocumentation,
    #[serde(default)]
    pub type_hint: Option<String>,
    /// Computed from the docstring on snapshot construction.
    #[serde(default, rename = "type", skip_deserializing)]
    pub ty: Option<Type>,
}

impl Parameter {
    pub fn name(&self) -> &str {
        simple_name(&self.id)
    }

    pub fn is_required(&self) -> bool {
        self.default_value.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementDocumentation {
    #[serde(default, rename = "type")]
    pub type_text: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub docstring: ElementDocumentation,
    #[serde(default)]
    pub type_hint: Option<String>,
    #[serde(default, rename = "type", skip_deserializing)]
    pub ty: Option<Type>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResult {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub docstring: ElementDocumentation,
    #[serde(default)]
    pub type_hint: Option<String>,
    #[serde(default, rename = "type", skip_deserializing)]
    pub ty: Option<Type>,
}

fn default_true() -> bool {
    true
}

/// Resolve the structured type of an element: docstring type text first,
/// raw type hint second, both interpreted with the docstring description.
pub fn resolve_type(type_text: &str, type_hint: Option<&str>, description: &str) -> Option<Type> {
    if !type_text.trim().is_empty() {
        if let Some(ty) = parse_type(type_text, description) {
            return Some(ty);
        }
    }
    type_hint
        .filter(|hint| !hint.trim().is_empty())
        .and_then(|hint| parse_type(hint, description))
}

// ---------------------------------------------------------------------------
// Borrowed polymorphic view
// ---------------------------------------------------------------------------

/// Any entity of a snapshot, borrowed.
#[derive(Debug, Clone, Copy)]
pub enum ApiElement<'a> {
    Class(&'a Class),
    Function(&'a Function),
    Parameter(&'a Parameter),
    Attribute(&'a Attribute),
    Result(&'a ApiResult),
}

impl<'a> ApiElement<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            ApiElement::Class(c) => &c.id,
            ApiElement::Function(f) => &f.id,
            ApiElement::Parameter(p) => &p.id,
            ApiElement::Attribute(a) => &a.id,
            ApiElement::Result(r) => &r.id,
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            ApiElement::Class(c) => c.name(),
            ApiElement::Function(f) => f.name(),
            ApiElement::Parameter(p) => p.name(),
            ApiElement::Attribute(a) => &a.name,
            ApiElement::Result(r) => &r.name,
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            ApiElement::Class(_) => ElementKind::Class,
            ApiElement::Function(_) => ElementKind::Function,
            ApiElement::Parameter(_) => ElementKind::Parameter,
            ApiElement::Attribute(_) => ElementKind::Attribute,
            ApiElement::Result(_) => ElementKind::Result,
        }
    }

    pub fn ty(&self) -> Option<&'a Type> {
        match self {
            ApiElement::Parameter(p) => p.ty.as_ref(),
            ApiElement::Attribute(a) => a.ty.as_ref(),
            ApiElement::Result(r) => r.ty.as_ref(),
            ApiElement::Class(_) | ApiElement::Function(_) => None,
        }
    }

    /// Literal source snippet; only classes and functions carry one.
    pub fn code(&self) -> Option<&'a str> {
        match self {
            ApiElement::Class(c) => Some(&c.code),
            ApiElement::Function(f) => Some(&f.code),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One version of a library's API.
#[derive(Debug, Clone, Default)]
pub struct Api {
    pub distribution: String,
    pub package: String,
    pub version: String,
    pub classes: IndexMap<String, Class>,
    pub functions: IndexMap<String, Function>,
    pub parameters: IndexMap<String, Parameter>,
    pub attributes: IndexMap<String, Attribute>,
    pub results: IndexMap<String, ApiResult>,
    parents: HashMap<String, String>,
    classes_by_qname: HashMap<String, String>,
}

impl Api {
    pub fn new(distribution: &str, package: &str, version: &str) -> Self {
        Self {
            distribution: distribution.to_string(),
            package: package.to_string(),
            version: version.to_string(),
            ..Self::default()
        }
    }

    pub fn add_class(&mut self, class: Class) {
        for method in &class.methods {
            self.parents.insert(method.clone(), class.id.clone());
        }
        for attribute in &class.attributes {
            self.parents.insert(attribute.clone(), class.id.clone());
        }
        self.classes_by_qname
            .insert(class.qname.clone(), class.id.clone());
        self.classes.insert(class.id.clone(), class);
    }

    pub fn add_function(&mut self, function: Function) {
        for parameter in &function.parameters {
            self.parents.insert(parameter.clone(), function.id.clone());
        }
        for result in &function.results {
            self.parents.insert(result.clone(), function.id.clone());
        }
        self.functions.insert(function.id.clone(), function);
    }

    pub fn add_parameter(&mut self, mut parameter: Parameter) {
        parameter.ty = resolve_type(
            &parameter.docstring.type_text,
            parameter.type_hint.as_deref(),
            &parameter.docstring.description,
        );
        self.parameters.insert(parameter.id.clone(), parameter);
    }

    pub fn add_attribute(&mut self, mut attribute: Attribute) {
        attribute.ty = resolve_type(
            &attribute.docstring.type_text,
            attribute.type_hint.as_deref(),
            &attribute.docstring.description,
        );
        self.attributes.insert(attribute.id.clone(), attribute);
    }

    pub fn add_result(&mut self, mut result: ApiResult) {
        result.ty = resolve_type(
            &result.docstring.type_text,
            result.type_hint.as_deref(),
            &result.docstring.description,
        );
        self.results.insert(result.id.clone(), result);
    }

    /// Identity of the containing class or function, if any.
    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.parents.get(id).map(String::as_str)
    }

    pub fn element(&self, id: &str) -> Option<ApiElement<'_>> {
        if let Some(c) = self.classes.get(id) {
            return Some(ApiElement::Class(c));
        }
        if let Some(f) = self.functions.get(id) {
            return Some(ApiElement::Function(f));
        }
        if let Some(p) = self.parameters.get(id) {
            return Some(ApiElement::Parameter(p));
        }
        if let Some(a) = self.attributes.get(id) {
            return Some(ApiElement::Attribute(a));
        }
        self.results.get(id).map(ApiElement::Result)
    }

    /// Elements of one kind in declaration order.
    pub fn elements(&self, kind: ElementKind) -> Vec<ApiElement<'_>> {
        match kind {
            ElementKind::Class => self.classes.values().map(ApiElement::Class).collect(),
            ElementKind::Function => self.functions.values().map(ApiElement::Function).collect(),
            ElementKind::Parameter => self.parameters.values().map(ApiElement::Parameter).collect(),
            ElementKind::Attribute => self.attributes.values().map(ApiElement::Attribute).collect(),
            ElementKind::Result => self.results.values().map(ApiElement::Result).collect(),
        }
    }

    /// Child identities of a container for the given child kind.
    pub fn children(&self, container: &str, kind: ElementKind) -> &[String] {
        match kind {
            ElementKind::Parameter => self
                .functions
                .get(container)
                .map(|f| f.parameters.as_slice())
                .unwrap_or(&[]),
            ElementKind::Result => self
                .functions
                .get(container)
                .map(|f| f.results.as_slice())
                .unwrap_or(&[]),
            ElementKind::Attribute => self
                .classes
                .get(container)
                .map(|c| c.attributes.as_slice())
                .unwrap_or(&[]),
            ElementKind::Function => self
                .classes
                .get(container)
                .map(|c| c.methods.as_slice())
                .unwrap_or(&[]),
            ElementKind::Class => &[],
        }
    }

    pub fn class_by_qname(&self, qname: &str) -> Option<&Class> {
        self.classes_by_qname
            .get(qname)
            .and_then(|id| self.classes.get(id))
    }

    /// Transitive superclasses of `class_id` that are defined in this snapshot.
    pub fn ancestors(&self, class_id: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<&str> = vec![class_id];
        while let Some(current) = stack.pop() {
            let Some(class) = self.classes.get(current) else {
                continue;
            };
            for superclass in &class.superclasses {
                if let Some(parent) = self.class_by_qname(superclass) {
                    if parent.id != class_id && seen.insert(parent.id.clone()) {
                        stack.push(&parent.id);
                    }
                }
            }
        }
        seen
    }

    /// Transitive subclasses of `class_id` within this snapshot.
    pub fn descendants(&self, class_id: &str) -> BTreeSet<String> {
        self.classes
            .keys()
            .filter(|id| id.as_str() != class_id && self.ancestors(id).contains(class_id))
            .cloned()
            .collect()
    }

    pub fn element_count(&self) -> usize {
        self.classes.len()
            + self.functions.len()
            + self.parameters.len()
            + self.attributes.len()
            + self.results.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
