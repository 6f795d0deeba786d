//! JSON value classification and equality.
//!
//! Targets are plain `serde_json::Value` trees. This module adds the two
//! things the matching engine needs on top of that: a closed `ValueType`
//! enum over the six JSON kinds, and a deep equality that treats integer
//! and float representations of the same number as equal (`1` matches
//! `1.0`, which `serde_json::Number`'s own `PartialEq` does not).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// The six JSON kinds. Used by type-predicate patterns and by the config
/// exclusion sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ValueType {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl ValueType {
    /// Classify a target value.
    pub fn of(value: &Value) -> ValueType {
        match value {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Boolean,
            Value::Number(_) => ValueType::Number,
            Value::String(_) => ValueType::String,
            Value::Array(_) => ValueType::Array,
            Value::Object(_) => ValueType::Object,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Null => "Null",
            ValueType::Boolean => "Boolean",
            ValueType::Number => "Number",
            ValueType::String => "String",
            ValueType::Array => "Array",
            ValueType::Object => "Object",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Deep equality with numeric cross-type tolerance.
///
/// Identical to `Value::eq` except that numbers compare by numeric value
/// rather than internal representation, at every nesting level.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(va, vb)| values_equal(va, vb))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, va)| y.get(k).is_some_and(|vb| values_equal(va, vb)))
        }
        _ => a == b,
    }
}

/// Numeric equality across integer/float representations.
///
/// Same-representation pairs compare exactly; mixed pairs compare as f64.
fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}
