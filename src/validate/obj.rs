//! Object keyword evaluation.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::errors::Error;
use crate::schema::{Additional, Document, Schema};

use super::validate_schema;

/// `whole` is the full instance, needed by schema dependencies.
pub(crate) fn validate(
    doc: &Document,
    s: &Schema,
    map: &Map<String, Value>,
    whole: &Value,
) -> Result<(), Error> {
    let count = map.len() as i64;
    if s.min_properties.present && count < s.min_properties.value {
        return Err(Error::MinPropertiesValidationFailed {
            observed: count,
            bound: s.min_properties.value,
        });
    }
    if s.max_properties.present && count > s.max_properties.value {
        return Err(Error::MaxPropertiesValidationFailed {
            observed: count,
            bound: s.max_properties.value,
        });
    }

    // Property names not yet claimed by `properties` or `patternProperties`;
    // whatever is left answers to `additionalProperties`.
    let mut remaining: BTreeSet<&str> = map.keys().map(|k| k.as_str()).collect();

    for (name, &sub) in &s.properties {
        match map.get(name) {
            Some(v) => {
                remaining.remove(name.as_str());
                validate_schema(doc, sub, v)?;
            }
            None => {
                if s.is_required(name) {
                    return Err(Error::RequiredField { name: name.clone() });
                }
            }
        }
    }

    // `required` names without a `properties` entry still have to exist.
    for name in &s.required {
        if !map.contains_key(name) {
            return Err(Error::RequiredField { name: name.clone() });
        }
    }

    if !s.pattern_properties.is_empty() {
        let mut matched = Vec::new();
        for &name in &remaining {
            for (rx, sub) in &s.pattern_properties {
                if rx.is_match(name) {
                    validate_schema(doc, *sub, &map[name])?;
                    matched.push(name);
                }
            }
        }
        for name in matched {
            remaining.remove(name);
        }
    }

    match s.additional_properties {
        Additional::Permissive => {}
        Additional::Deny => {
            if !remaining.is_empty() {
                return Err(Error::AdditionalProperties);
            }
        }
        Additional::Schema(sub) => {
            for name in &remaining {
                validate_schema(doc, sub, &map[*name])?;
            }
        }
    }

    for (name, needs) in &s.dependencies.names {
        if map.contains_key(name) {
            for dep in needs {
                if !map.contains_key(dep) {
                    return Err(Error::RequiredField { name: dep.clone() });
                }
            }
        }
    }
    for (name, &sub) in &s.dependencies.schemas {
        if map.contains_key(name) {
            validate_schema(doc, sub, whole)?;
        }
    }

    Ok(())
}
