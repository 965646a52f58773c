//! Annotations derived from a snapshot and its usage counts.
//!
//! Produces `Remove` for unused public classes and functions, `Constant` for
//! parameters that only ever receive one value, and `Boundary`/`Enum` for
//! parameters whose documented type carries a range or a value set.

pub mod usages;

use tracing::info;

use crate::model::annotations::{Annotation, AnnotationHeader, DefaultValue, EnumPair, Interval};
use crate::model::api::{Api, Parameter};
use crate::store::AnnotationStore;

pub use usages::UsageCounts;

pub fn generate_annotations(api: &Api, usages: &UsageCounts, author: &str) -> AnnotationStore {
    let mut store = AnnotationStore::new();

    for class in api.classes.values() {
        if class.is_public && usages.class_usages(&class.id) == 0 {
            store.add(Annotation::Remove {
                header: AnnotationHeader::new(class.id.as_str(), author),
            });
        }
    }
    for function in api.functions.values() {
        if function.is_public && usages.function_usages(&function.id) == 0 {
            store.add(Annotation::Remove {
                header: AnnotationHeader::new(function.id.as_str(), author),
            });
        }
    }

    for parameter in api.parameters.values() {
        if !parameter.is_public {
            continue;
        }
        if let Some(constant) = constant_value(api, usages, parameter) {
            store.add(Annotation::Constant {
                header: AnnotationHeader::new(parameter.id.as_str(), author),
                default: constant,
            });
            continue;
        }
        let Some(ty) = &parameter.ty else {
            continue;
        };
        if let Some(boundary) = ty.boundary() {
            store.add(Annotation::Boundary {
                header: AnnotationHeader::new(parameter.id.as_str(), author),
                interval: Interval::from_boundary(boundary),
            });
        }
        if let Some(enum_type) = ty.enum_type().filter(|e| !e.values.is_empty()) {
            store.add(Annotation::Enum {
                header: AnnotationHeader::new(parameter.id.as_str(), author),
                enum_name: upper_camel_case(parameter.name()),
                pairs: enum_type
                    .values
                    .iter()
                    .map(|value| EnumPair {
                        string_value: value.clone(),
                        instance_name: upper_snake_case(value),
                    })
                    .collect(),
            });
        }
    }

    info!(
        "generated {} annotations for {} {}",
        store.len(),
        api.distribution,
        api.version
    );
    store
}

/// The single value a parameter receives at every call site, if the
/// parameter is used at all and its function is called.
fn constant_value(api: &Api, usages: &UsageCounts, parameter: &Parameter) -> Option<DefaultValue> {
    let function = api.parent_of(&parameter.id)?;
    let calls = usages.function_usages(function);
    if calls == 0 || usages.parameter_usages(&parameter.id) == 0 {
        return None;
    }
    let values = usages.effective_values(parameter, calls);
    if values.len() != 1 {
        return None;
    }
    values.keys().next().map(|literal| DefaultValue::from_literal(literal))
}

fn upper_camel_case(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

fn upper_snake_case(value: &str) -> String {
    let words: Vec<String> = value
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_ascii_uppercase())
        .collect();
    let name = words.join("_");
    if name.is_empty() {
        "EMPTY".to_string()
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("VALUE_{name}")
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::annotations::AnnotationKind;
    use crate::model::api::{Class, Function, ParameterDocumentation};

    const AUTHOR: &str = "$autogen$";

    fn api() -> Api {
        let mut api = Api::new("demo", "demo", "1");
        api.add_class(Class {
            id: "demo/demo/Unused".into(),
            qname: "demo.Unused".into(),
            is_public: true,
            ..Class::default()
        });
        api.add_function(Function {
            id: "demo/demo/fit".into(),
            qname: "demo.fit".into(),
            parameters: vec![
                "demo/demo/fit/alpha".into(),
                "demo/demo/fit/solver".into(),
                "demo/demo/fit/verbose".into(),
            ],
            is_public: true,
            ..Function::default()
        });
        api.add_parameter(Parameter {
            id: "demo/demo/fit/alpha".into(),
            qname: "demo.fit.alpha".into(),
            default_value: Some("1.0".into()),
            docstring: ParameterDocumentation {
                type_text: "float".into(),
                description: "Regularization in the range (0, inf).".into(),
                ..ParameterDocumentation::default()
            },
            is_public: true,
            ..Parameter::default()
        });
        api.add_parameter(Parameter {
            id: "demo/demo/fit/solver".into(),
            qname: "demo.fit.solver".into(),
            default_value: Some("'auto'".into()),
            docstring: ParameterDocumentation {
                type_text: "{'auto', 'l-bfgs'}".into(),
                ..ParameterDocumentation::default()
            },
            is_public: true,
            ..Parameter::default()
        });
        api.add_parameter(Parameter {
            id: "demo/demo/fit/verbose".into(),
            qname: "demo.fit.verbose".into(),
            default_value: Some("False".into()),
            is_public: true,
            ..Parameter::default()
        });
        api
    }

    fn usages() -> UsageCounts {
        UsageCounts::from_json(
            r#"{
                "function_usages": {"demo/demo/fit": 4},
                "parameter_usages": {"demo/demo/fit/alpha": 2, "demo/demo/fit/verbose": 4},
                "value_usages": {
                    "demo/demo/fit/alpha": {"0.5": 2},
                    "demo/demo/fit/verbose": {"True": 4}
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_unused_public_elements_get_remove() {
        let store = generate_annotations(&api(), &usages(), AUTHOR);
        assert!(store.get(AnnotationKind::Remove, "demo/demo/Unused").is_some());
        assert!(store.get(AnnotationKind::Remove, "demo/demo/fit").is_none());
    }

    #[test]
    fn test_single_value_parameter_gets_constant() {
        let store = generate_annotations(&api(), &usages(), AUTHOR);
        assert_eq!(
            store.get(AnnotationKind::Constant, "demo/demo/fit/verbose"),
            Some(&Annotation::Constant {
                header: AnnotationHeader::new("demo/demo/fit/verbose", AUTHOR),
                default: DefaultValue::Boolean(true),
            })
        );
        // 0.5 twice plus the default 1.0 twice is two distinct values.
        assert!(store.get(AnnotationKind::Constant, "demo/demo/fit/alpha").is_none());
    }

    #[test]
    fn test_unused_parameter_is_not_constant() {
        let store = generate_annotations(&api(), &usages(), AUTHOR);
        assert!(store.get(AnnotationKind::Constant, "demo/demo/fit/solver").is_none());
    }

    #[test]
    fn test_typed_parameters_get_boundary_and_enum() {
        let store = generate_annotations(&api(), &usages(), AUTHOR);
        match store.get(AnnotationKind::Boundary, "demo/demo/fit/alpha") {
            Some(Annotation::Boundary { interval, .. }) => {
                assert!(!interval.is_discrete);
                assert_eq!(interval.lower_interval_limit, 0.0);
            }
            other => panic!("unexpected {other:?}"),
        }
        match store.get(AnnotationKind::Enum, "demo/demo/fit/solver") {
            Some(Annotation::Enum {
                enum_name, pairs, ..
            }) => {
                assert_eq!(enum_name, "Solver");
                let names: Vec<&str> = pairs.iter().map(|p| p.instance_name.as_str()).collect();
                assert_eq!(names, vec!["AUTO", "L_BFGS"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_name_helpers() {
        assert_eq!(upper_camel_case("solver_mode"), "SolverMode");
        assert_eq!(upper_snake_case("l-bfgs"), "L_BFGS");
        assert_eq!(upper_snake_case("2d"), "VALUE_2D");
        assert_eq!(upper_snake_case(""), "EMPTY");
    }
}
