//! Array keyword evaluation.

use serde_json::Value;

use crate::errors::Error;
use crate::schema::{Additional, Document, ItemSpec, Schema};
use crate::value::json_equal;

use super::validate_schema;

pub(crate) fn validate(doc: &Document, s: &Schema, xs: &[Value]) -> Result<(), Error> {
    let len = xs.len() as i64;
    if s.min_items.present && len < s.min_items.value {
        return Err(Error::MinItemsValidationFailed {
            observed: len,
            bound: s.min_items.value,
        });
    }
    if s.max_items.present && len > s.max_items.value {
        return Err(Error::MaxItemsValidationFailed {
            observed: len,
            bound: s.max_items.value,
        });
    }

    match &s.items {
        None => {}
        Some(ItemSpec::Single(sub)) => {
            for el in xs {
                validate_schema(doc, *sub, el)?;
            }
        }
        Some(ItemSpec::Tuple(ids)) => {
            for (i, el) in xs.iter().enumerate() {
                match ids.get(i) {
                    Some(&sub) => validate_schema(doc, sub, el)?,
                    // Past the tuple: additionalItems takes over.
                    None => match s.additional_items {
                        Additional::Permissive => break,
                        Additional::Deny => return Err(Error::ArrayItemValidationFailed),
                        Additional::Schema(sub) => validate_schema(doc, sub, el)?,
                    },
                }
            }
        }
    }

    if s.unique_items.get() {
        for i in 0..xs.len() {
            for j in i + 1..xs.len() {
                if json_equal(&xs[i], &xs[j]) {
                    return Err(Error::UniqueItemsValidationFailed);
                }
            }
        }
    }

    Ok(())
}
