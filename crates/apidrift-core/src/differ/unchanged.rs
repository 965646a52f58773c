//! Last stage: byte-identical elements short-circuit to 1.0.
//!
//! Classes and functions compare a SHA-256 fingerprint of their source
//! snippet; parameters, attributes and results compare a fingerprint of their
//! serialized record (type included) with `id` and `qname` left out, so a
//! moved parameter still matches. The fast path only applies to pairs the
//! inheritance stage admits; everything else is delegated to an
//! [`InheritanceDiffer`] over the same previous mapping.

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::differ::inheritance::InheritanceDiffer;
use crate::differ::{Differ, DifferStage};
use crate::model::api::{Api, ApiElement};
use crate::model::mapping::MappingSet;

pub struct UnchangedDiffer<'a> {
    inheritance: InheritanceDiffer<'a>,
}

impl<'a> UnchangedDiffer<'a> {
    pub fn new(old: &'a Api, new: &'a Api, previous: Option<&'a MappingSet>, boost: f64) -> Self {
        Self {
            inheritance: InheritanceDiffer::new(old, new, previous, boost),
        }
    }
}

/// Serialized record without its identity, keyed by simple name instead.
fn record_bytes<T: Serialize>(record: &T, name: &str) -> Option<Vec<u8>> {
    let mut value = serde_json::to_value(record).ok()?;
    let fields = value.as_object_mut()?;
    fields.remove("id");
    fields.remove("qname");
    fields.insert("name".to_string(), serde_json::Value::from(name));
    serde_json::to_vec(&value).ok()
}

/// Hex SHA-256 of an element's code, or of its identity-free record when it
/// has no code. `None` if the record cannot be serialized.
pub fn fingerprint(element: &ApiElement<'_>) -> Option<String> {
    let bytes = match element {
        ApiElement::Class(c) => c.code.as_bytes().to_vec(),
        ApiElement::Function(f) => f.code.as_bytes().to_vec(),
        ApiElement::Parameter(p) => record_bytes(p, p.name())?,
        ApiElement::Attribute(a) => record_bytes(a, &a.name)?,
        ApiElement::Result(r) => record_bytes(r, &r.name)?,
    };
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Some(format!("{:x}", hasher.finalize()))
}

impl Differ for UnchangedDiffer<'_> {
    fn stage(&self) -> DifferStage {
        DifferStage::Unchanged
    }

    fn similarity(&self, x: ApiElement<'_>, y: ApiElement<'_>) -> f64 {
        if x.kind() != y.kind() {
            return 0.0;
        }
        // Empty snippets carry no evidence.
        let has_code = x.code().map_or(true, |code| !code.is_empty());
        if has_code && self.inheritance.admits(&x, &y) {
            if let (Some(a), Some(b)) = (fingerprint(&x), fingerprint(&y)) {
                if a == b {
                    debug!("unchanged {} -> {}", x.id(), y.id());
                    return 1.0;
                }
            }
        }
        self.inheritance.similarity(x, y)
    }
}
