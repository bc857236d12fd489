//! The validation engine.
//!
//! One recursive entry point: follow the `$ref` chain, run the composition
//! keywords (`not`, `allOf`, `anyOf`, `oneOf` — all of them, in that order),
//! check `type` and `enum`, then hand off to the evaluator for the value's
//! kind. Evaluation is short-circuit: the first failure in a branch wins,
//! except where a keyword inherently counts (`anyOf`, `oneOf`).

pub mod arr;
pub mod num;
pub mod obj;
pub mod str;

use serde_json::Value;
use tracing::trace;

use crate::errors::Error;
use crate::schema::{Document, PrimitiveType, Schema, SchemaId};
use crate::value::{is_integral, json_equal, kind_name};

impl Document {
    /// Validate a decoded JSON value against this schema document.
    pub fn validate(&self, value: &Value) -> Result<(), Error> {
        validate_schema(self, self.root_id(), value)
    }
}

/// Validate `value` against one node, dereferencing `$ref` first.
pub(crate) fn validate_schema(doc: &Document, id: SchemaId, value: &Value) -> Result<(), Error> {
    let (doc, id) = deref(doc, id)?;
    let s = doc.node(id);
    trace!(node = id.0, kind = kind_name(value), "validating");

    check_composition(doc, s, value)?;
    check_type(s, value)?;
    check_enum(s, value)?;

    match value {
        Value::Object(m) => obj::validate(doc, s, m, value),
        Value::Array(xs) => arr::validate(doc, s, xs),
        Value::String(text) => str::validate(s, text),
        Value::Number(n) => num::validate(s, n),
        Value::Bool(_) | Value::Null => Ok(()),
    }
}

/// Follow a `$ref` chain to its target. A chain that revisits a node is a
/// degenerate cycle and imposes no further constraints, so the walk stops
/// there; cycles that pass through structural keywords unwind with the
/// instance instead.
fn deref<'a>(doc: &'a Document, id: SchemaId) -> Result<(&'a Document, SchemaId), Error> {
    let mut cur_doc = doc;
    let mut cur = id;
    let mut visited: Vec<(*const Document, SchemaId)> = Vec::new();
    while !cur_doc.node(cur).reference.is_empty() {
        let key = (cur_doc as *const Document, cur);
        if visited.contains(&key) {
            break;
        }
        visited.push(key);
        let reference = cur_doc.node(cur).reference.clone();
        let (next_doc, next) = cur_doc.resolve(cur, &reference)?;
        cur_doc = next_doc;
        cur = next;
    }
    Ok((cur_doc, cur))
}

/// Every composition keyword that is present must hold.
fn check_composition(doc: &Document, s: &Schema, value: &Value) -> Result<(), Error> {
    if let Some(not) = s.not {
        if validate_schema(doc, not, value).is_ok() {
            return Err(Error::NotValidationFailed);
        }
    }
    for &sub in &s.all_of {
        // Sub-schema failures under allOf propagate as-is.
        validate_schema(doc, sub, value)?;
    }
    if !s.any_of.is_empty()
        && !s
            .any_of
            .iter()
            .any(|&sub| validate_schema(doc, sub, value).is_ok())
    {
        return Err(Error::AnyOfValidationFailed);
    }
    if !s.one_of.is_empty() {
        let passed = s
            .one_of
            .iter()
            .filter(|&&sub| validate_schema(doc, sub, value).is_ok())
            .count();
        if passed != 1 {
            return Err(Error::OneOfValidationFailed);
        }
    }
    Ok(())
}

fn check_type(s: &Schema, value: &Value) -> Result<(), Error> {
    if s.types.is_empty() {
        return Ok(());
    }
    let permits = |t: PrimitiveType| s.types.contains(&t);
    let ok = match value {
        Value::Null => permits(PrimitiveType::Null),
        Value::Bool(_) => permits(PrimitiveType::Boolean),
        Value::String(_) => permits(PrimitiveType::String),
        Value::Object(_) => permits(PrimitiveType::Object),
        Value::Array(_) => permits(PrimitiveType::Array),
        // An integral number satisfies both `integer` and `number`.
        Value::Number(n) => {
            if is_integral(n) {
                permits(PrimitiveType::Integer) || permits(PrimitiveType::Number)
            } else {
                permits(PrimitiveType::Number)
            }
        }
    };
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidType)
    }
}

fn check_enum(s: &Schema, value: &Value) -> Result<(), Error> {
    if s.enum_.is_empty() || s.enum_.iter().any(|e| json_equal(e, value)) {
        Ok(())
    } else {
        Err(Error::InvalidEnum)
    }
}
