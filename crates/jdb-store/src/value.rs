//! Runtime classification of untyped document values.
//!
//! Documents hold [`serde_json::Value`] trees with no schema. Every access
//! point that needs a particular shape (a mapping to descend into, a sequence
//! to append to, an integer to count with) checks the [`ValueKind`] first and
//! reports a type mismatch otherwise.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The shape of a JSON value, with numbers split into integers and floats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Null,
    Bool,
    Integer,
    Float,
    String,
    Array,
    Object,
}

impl ValueKind {
    /// Classify a value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(n) if n.is_f64() => ValueKind::Float,
            Value::Number(_) => ValueKind::Integer,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Lowercase name used in error messages and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extract a signed 64-bit integer from a value.
///
/// Floats (even integral ones such as `3.0`), strings and unsigned values
/// above `i64::MAX` are not counters and yield `None`.
pub fn as_counter(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) if !n.is_f64() => n.as_i64(),
        _ => None,
    }
}
