//! Blended similarity between two API elements of the same kind.
//!
//! The score combines name, type, documentation, structure and code
//! signals as a weighted mean. Signals that do not apply to a kind (types
//! for classes, code for parameters, ...) are left out of the mean rather
//! than scored as zero.

use std::collections::BTreeSet;

use crate::config::SimilarityWeights;
use crate::differ::distance::{jaccard, normalized_similarity, string_similarity, text_similarity};
use crate::model::api::{Api, ApiElement, ApiResult, Attribute, Class, Function, Parameter};
use crate::model::types::Type;

// ---------------------------------------------------------------------------
// Weighted mean accumulator
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Blend {
    total: f64,
    weight: f64,
}

impl Blend {
    fn add(&mut self, weight: f64, score: f64) {
        self.total += weight * score;
        self.weight += weight;
    }

    fn finish(self) -> f64 {
        if self.weight <= 0.0 {
            return 0.0;
        }
        (self.total / self.weight).clamp(0.0, 1.0)
    }
}

fn categorical(equal: bool) -> f64 {
    if equal {
        1.0
    } else {
        0.0
    }
}

fn mean(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 1.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

// ---------------------------------------------------------------------------
// Type similarity
// ---------------------------------------------------------------------------

/// Structural similarity of two optional types.
///
/// Equal types score 1. Unions (and a plain type against a union) compare
/// as member sets, enums compare their value sets; other same-variant pairs
/// get partial credit, different variants none.
pub fn type_similarity(a: Option<&Type>, b: Option<&Type>) -> f64 {
    let (a, b) = match (a, b) {
        (None, None) => return 1.0,
        (Some(a), Some(b)) => (a, b),
        _ => return 0.0,
    };
    if a == b {
        return 1.0;
    }
    match (a, b) {
        (Type::Union(_), _) | (_, Type::Union(_)) => {
            let left: BTreeSet<&Type> = a.members().into_iter().collect();
            let right: BTreeSet<&Type> = b.members().into_iter().collect();
            jaccard(&left, &right)
        }
        (Type::Enum(left), Type::Enum(right)) => jaccard(&left.values, &right.values),
        (Type::Named(left), Type::Named(right)) => 0.5 * string_similarity(&left.name, &right.name),
        (Type::Boundary(left), Type::Boundary(right)) => {
            if left.base_type == right.base_type {
                0.5
            } else {
                0.25
            }
        }
        _ => 0.0,
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Pairwise similarity with a fixed weight vector.
#[derive(Debug, Clone)]
pub struct SimilarityEngine {
    weights: SimilarityWeights,
}

impl Default for SimilarityEngine {
    fn default() -> Self {
        Self::new(SimilarityWeights::default())
    }
}

impl SimilarityEngine {
    pub fn new(weights: SimilarityWeights) -> Self {
        Self { weights }
    }

    /// Similarity in `[0, 1]` of `x` (from `old`) and `y` (from `new`).
    /// Elements of different kinds score 0.
    pub fn similarity(&self, old: &Api, x: ApiElement<'_>, new: &Api, y: ApiElement<'_>) -> f64 {
        match (x, y) {
            (ApiElement::Class(a), ApiElement::Class(b)) => self.class_similarity(old, a, new, b),
            (ApiElement::Function(a), ApiElement::Function(b)) => {
                self.function_similarity(old, a, new, b)
            }
            (ApiElement::Parameter(a), ApiElement::Parameter(b)) => self.parameter_similarity(a, b),
            (ApiElement::Attribute(a), ApiElement::Attribute(b)) => self.attribute_similarity(a, b),
            (ApiElement::Result(a), ApiElement::Result(b)) => self.result_similarity(a, b),
            _ => 0.0,
        }
    }

    pub fn class_similarity(&self, old: &Api, a: &Class, new: &Api, b: &Class) -> f64 {
        let superclasses = jaccard(
            &a.superclasses.iter().map(String::as_str).collect(),
            &b.superclasses.iter().map(String::as_str).collect(),
        );
        let members = jaccard(&class_member_names(old, a), &class_member_names(new, b));

        let mut blend = Blend::default();
        blend.add(self.weights.name, string_similarity(a.name(), b.name()));
        blend.add(
            self.weights.documentation,
            text_similarity(&a.description, &b.description),
        );
        blend.add(self.weights.structure, mean(&[superclasses, members]));
        blend.add(self.weights.code, categorical(a.code == b.code));
        blend.finish()
    }

    pub fn function_similarity(&self, old: &Api, a: &Function, new: &Api, b: &Function) -> f64 {
        let parameters = normalized_similarity(
            &child_names(old, &a.parameters),
            &child_names(new, &b.parameters),
        );
        let results = normalized_similarity(
            &child_names(old, &a.results),
            &child_names(new, &b.results),
        );
        let decorators = jaccard(
            &a.decorators.iter().map(String::as_str).collect(),
            &b.decorators.iter().map(String::as_str).collect(),
        );

        let mut blend = Blend::default();
        blend.add(self.weights.name, string_similarity(a.name(), b.name()));
        blend.add(
            self.weights.documentation,
            text_similarity(&a.description, &b.description),
        );
        blend.add(self.weights.structure, mean(&[parameters, results, decorators]));
        blend.add(self.weights.code, categorical(a.code == b.code));
        blend.finish()
    }

    pub fn parameter_similarity(&self, a: &Parameter, b: &Parameter) -> f64 {
        let structure = mean(&[
            categorical(a.default_value == b.default_value),
            categorical(a.assigned_by == b.assigned_by),
        ]);

        let mut blend = Blend::default();
        blend.add(self.weights.name, string_similarity(a.name(), b.name()));
        blend.add(self.weights.type_, type_similarity(a.ty.as_ref(), b.ty.as_ref()));
        blend.add(
            self.weights.documentation,
            text_similarity(&a.docstring.description, &b.docstring.description),
        );
        blend.add(self.weights.structure, structure);
        blend.finish()
    }

    pub fn attribute_similarity(&self, a: &Attribute, b: &Attribute) -> f64 {
        let mut blend = Blend::default();
        blend.add(self.weights.name, string_similarity(&a.name, &b.name));
        blend.add(self.weights.type_, type_similarity(a.ty.as_ref(), b.ty.as_ref()));
        blend.add(
            self.weights.documentation,
            text_similarity(&a.docstring.description, &b.docstring.description),
        );
        blend.finish()
    }

    pub fn result_similarity(&self, a: &ApiResult, b: &ApiResult) -> f64 {
        let mut blend = Blend::default();
        blend.add(self.weights.name, string_similarity(&a.name, &b.name));
        blend.add(self.weights.type_, type_similarity(a.ty.as_ref(), b.ty.as_ref()));
        blend.add(
            self.weights.documentation,
            text_similarity(&a.docstring.description, &b.docstring.description),
        );
        blend.finish()
    }
}

fn child_names<'a>(api: &'a Api, ids: &'a [String]) -> Vec<&'a str> {
    ids.iter()
        .map(|id| api.element(id).map(|e| e.name()).unwrap_or(id.as_str()))
        .collect()
}

fn class_member_names<'a>(api: &'a Api, class: &'a Class) -> BTreeSet<&'a str> {
    child_names(api, &class.methods)
        .into_iter()
        .chain(child_names(api, &class.attributes))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::api::{ElementDocumentation, ElementKind, ParameterDocumentation};

    fn class(name: &str, doc: &str, code: &str) -> Class {
        Class {
            id: format!("test/test/{name}"),
            qname: format!("test.{name}"),
            description: doc.into(),
            code: code.into(),
            ..Class::default()
        }
    }

    fn sample_api() -> Api {
        let mut api = Api::new("test", "test", "1.0");
        api.add_class(Class {
            methods: vec!["test/test/Test/fit".into()],
            attributes: vec!["test/test/Test/coef".into()],
            superclasses: vec!["test.Base".into()],
            ..class("Test", "This is a test", "class Test:\n    pass")
        });
        api.add_function(Function {
            id: "test/test/Test/fit".into(),
            qname: "test.Test.fit".into(),
            parameters: vec!["test/test/Test/fit/x".into()],
            results: vec!["test/test/Test/fit/result_1".into()],
            description: "Fit the model".into(),
            code: "def fit(self, x):\n    return self".into(),
            ..Function::default()
        });
        api.add_parameter(Parameter {
            id: "test/test/Test/fit/x".into(),
            qname: "test.Test.fit.x".into(),
            default_value: Some("1".into()),
            docstring: ParameterDocumentation {
                type_text: "int or str".into(),
                default_value: "1".into(),
                description: "Input in the range [0, 10]".into(),
            },
            ..Parameter::default()
        });
        api.add_attribute(Attribute {
            id: "test/test/Test/coef".into(),
            name: "coef".into(),
            docstring: ElementDocumentation {
                type_text: "{'a', 'b'}".into(),
                description: "Coefficients".into(),
            },
            ..Attribute::default()
        });
        api.add_result(ApiResult {
            id: "test/test/Test/fit/result_1".into(),
            name: "result_1".into(),
            docstring: ElementDocumentation {
                type_text: "Test".into(),
                description: "The fitted model".into(),
            },
            ..ApiResult::default()
        });
        api
    }

    #[test]
    fn test_self_similarity_is_exactly_one() {
        let api = sample_api();
        let engine = SimilarityEngine::default();
        for kind in ElementKind::ALL {
            for element in api.elements(kind) {
                assert_eq!(
                    engine.similarity(&api, element, &api, element),
                    1.0,
                    "self-similarity of {}",
                    element.id()
                );
            }
        }
    }

    #[test]
    fn test_different_kinds_score_zero() {
        let api = sample_api();
        let engine = SimilarityEngine::default();
        let class = api.element("test/test/Test").unwrap();
        let function = api.element("test/test/Test/fit").unwrap();
        assert_eq!(engine.similarity(&api, class, &api, function), 0.0);
    }

    #[test]
    fn test_renamed_class_stays_similar() {
        let mut old = Api::new("test", "test", "1");
        old.add_class(class("Test", "This is a test", "class Test:\n    pass"));
        let mut new = Api::new("test", "test", "2");
        new.add_class(class("TestA", "This is a test", "class TestA:\n    pass"));
        let engine = SimilarityEngine::default();
        let score = engine.class_similarity(
            &old,
            &old.classes["test/test/Test"],
            &new,
            &new.classes["test/test/TestA"],
        );
        assert!(score > 0.75 && score < 1.0, "score was {score}");
    }

    #[test]
    fn test_unrelated_class_scores_low() {
        let mut old = Api::new("test", "test", "1");
        old.add_class(class("Test", "This is a test", "class Test:\n    pass"));
        let mut new = Api::new("test", "test", "2");
        new.add_class(class(
            "Frobnicator",
            "Computes spectral decompositions of sparse matrices",
            "class Frobnicator:\n    def run(self):\n        return 1",
        ));
        let engine = SimilarityEngine::default();
        let score = engine.class_similarity(
            &old,
            &old.classes["test/test/Test"],
            &new,
            &new.classes["test/test/Frobnicator"],
        );
        assert!(score < 0.4, "score was {score}");
    }

    #[test]
    fn test_type_similarity_rules() {
        let int = Type::named("int");
        let union = Type::union([Type::named("int"), Type::named("str")]).unwrap();
        assert_eq!(type_similarity(None, None), 1.0);
        assert_eq!(type_similarity(Some(&int), None), 0.0);
        assert_eq!(type_similarity(Some(&int), Some(&union)), 0.5);
        let e1 = Type::enumeration(["a", "b"]);
        let e2 = Type::enumeration(["b", "c"]);
        assert!((type_similarity(Some(&e1), Some(&e2)) - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(type_similarity(Some(&int), Some(&e1)), 0.0);
    }
}
