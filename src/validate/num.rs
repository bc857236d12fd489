//! Numeric keyword evaluation.

use serde_json::Number;

use crate::errors::Error;
use crate::schema::Schema;
use crate::value::as_f64;

pub(crate) fn validate(s: &Schema, n: &Number) -> Result<(), Error> {
    let f = as_f64(n);

    if s.minimum.present {
        let exclusive = s.exclusive_minimum.get();
        let ok = if exclusive {
            f > s.minimum.value
        } else {
            f >= s.minimum.value
        };
        if !ok {
            return Err(Error::MinimumValidationFailed {
                observed: f,
                bound: s.minimum.value,
                exclusive,
            });
        }
    }

    if s.maximum.present {
        let exclusive = s.exclusive_maximum.get();
        let ok = if exclusive {
            f < s.maximum.value
        } else {
            f <= s.maximum.value
        };
        if !ok {
            return Err(Error::MaximumValidationFailed {
                observed: f,
                bound: s.maximum.value,
                exclusive,
            });
        }
    }

    if s.multiple_of.present && (f % s.multiple_of.value) != 0.0 {
        return Err(Error::MultipleOfValidationFailed);
    }

    Ok(())
}
