//! String keyword evaluation.

use crate::errors::Error;
use crate::format;
use crate::schema::Schema;
use crate::value::codepoint_len;

pub(crate) fn validate(s: &Schema, text: &str) -> Result<(), Error> {
    // Lengths count Unicode codepoints, not bytes.
    let len = codepoint_len(text) as i64;
    if s.min_length.present && len < s.min_length.value {
        return Err(Error::MinLengthValidationFailed {
            observed: len,
            bound: s.min_length.value,
        });
    }
    if s.max_length.present && len > s.max_length.value {
        return Err(Error::MaxLengthValidationFailed {
            observed: len,
            bound: s.max_length.value,
        });
    }

    if let Some(rx) = &s.pattern {
        if !rx.is_match(text) {
            return Err(Error::PatternValidationFailed {
                string: text.to_string(),
                pattern: rx.as_str().to_string(),
            });
        }
    }

    if let Some(f) = &s.format {
        format::check(f, text)?;
    }

    Ok(())
}
