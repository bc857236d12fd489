//! Uniform read access to decoded JSON values.
//!
//! The engine works directly on `serde_json::Value`; the helpers here cover
//! the few places where the raw value API is not enough: a display name per
//! kind, integer detection, codepoint-based string length, and structural
//! equality with numeric normalization.

use serde_json::{Number, Value};

/// Display name of a value's JSON kind, for error reporting.
pub fn kind_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Numeric value as f64. Integers beyond 2^53 lose precision here, which is
/// the draft-04 contract for interoperable numbers.
pub fn as_f64(n: &Number) -> f64 {
    if let Some(i) = n.as_i64() {
        i as f64
    } else if let Some(u) = n.as_u64() {
        u as f64
    } else {
        n.as_f64().unwrap_or(f64::NAN)
    }
}

/// True when the number has no fractional part, regardless of how the
/// decoder happened to represent it (`1`, `1.0`, and `1e0` all count).
pub fn is_integral(n: &Number) -> bool {
    if n.is_i64() || n.is_u64() {
        return true;
    }
    match n.as_f64() {
        Some(f) => f.fract() == 0.0 && f.is_finite(),
        None => false,
    }
}

/// String length in Unicode codepoints, not bytes.
pub fn codepoint_len(s: &str) -> usize {
    s.chars().count()
}

/// JSON-structural equality.
///
/// Numbers compare by numeric value, so `1` equals `1.0`. Objects compare by
/// key set and per-key equality; key order is irrelevant.
pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => as_f64(x) == as_f64(y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(xm), Value::Object(ym)) => {
            xm.len() == ym.len()
                && xm
                    .iter()
                    .all(|(k, x)| ym.get(k).is_some_and(|y| json_equal(x, y)))
        }
        _ => false,
    }
}
