//! API snapshot documents as produced by the extractor.
//!
//! Entities are listed per kind in declaration order. Types are always
//! recomputed from docstrings on load.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{ApiDriftError, ApiDriftResult};
use crate::model::api::{Api, ApiResult, Attribute, Class, ElementKind, Function, Parameter};

#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotDocument {
    distribution: String,
    package: String,
    version: String,
    #[serde(default)]
    classes: Vec<Class>,
    #[serde(default)]
    functions: Vec<Function>,
    #[serde(default)]
    parameters: Vec<Parameter>,
    #[serde(default)]
    attributes: Vec<Attribute>,
    #[serde(default)]
    results: Vec<ApiResult>,
}

pub fn api_from_json(text: &str) -> ApiDriftResult<Api> {
    let document: SnapshotDocument = serde_json::from_str(text)?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut claim = |id: &str| -> ApiDriftResult<()> {
        if !seen.insert(id.to_string()) {
            return Err(ApiDriftError::InvalidDocument(format!(
                "identity {id} is declared more than once"
            )));
        }
        Ok(())
    };

    let mut api = Api::new(&document.distribution, &document.package, &document.version);
    for class in document.classes {
        claim(&class.id)?;
        api.add_class(class);
    }
    for function in document.functions {
        claim(&function.id)?;
        api.add_function(function);
    }
    for parameter in document.parameters {
        claim(&parameter.id)?;
        api.add_parameter(parameter);
    }
    for attribute in document.attributes {
        claim(&attribute.id)?;
        api.add_attribute(attribute);
    }
    for result in document.results {
        claim(&result.id)?;
        api.add_result(result);
    }

    check_children(&api)?;
    debug!(
        "loaded {} {} with {} elements",
        api.distribution,
        api.version,
        api.element_count()
    );
    Ok(api)
}

/// Every child listed by a container must be declared with the right kind.
fn check_children(api: &Api) -> ApiDriftResult<()> {
    let containers = api
        .classes
        .keys()
        .map(|id| (id, [ElementKind::Function, ElementKind::Attribute]))
        .chain(
            api.functions
                .keys()
                .map(|id| (id, [ElementKind::Parameter, ElementKind::Result])),
        );
    for (container, kinds) in containers {
        for kind in kinds {
            for child in api.children(container, kind) {
                match api.element(child) {
                    Some(element) if element.kind() == kind => {}
                    _ => {
                        return Err(ApiDriftError::InvalidDocument(format!(
                            "{container} lists {kind} {child}, which is not declared"
                        )))
                    }
                }
            }
        }
    }
    Ok(())
}

pub fn load_api(path: &Path) -> ApiDriftResult<Api> {
    let text = fs::read_to_string(path)?;
    api_from_json(&text)
}

pub fn api_to_json(api: &Api) -> ApiDriftResult<String> {
    let document = SnapshotDocument {
        distribution: api.distribution.clone(),
        package: api.package.clone(),
        version: api.version.clone(),
        classes: api.classes.values().cloned().collect(),
        functions: api.functions.values().cloned().collect(),
        parameters: api.parameters.values().cloned().collect(),
        attributes: api.attributes.values().cloned().collect(),
        results: api.results.values().cloned().collect(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}
