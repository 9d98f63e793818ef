//! `serde_json::Value` <-> [`Value`] conversion utilities
//!
//! `serde_json` is built with `preserve_order`, so object fields keep the
//! order they were written in on the way in and on the way out.

use crate::value::{Document, Value};

/// Convert serde_json::Value to a document Value
pub fn json_to_value(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::Null
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(json_to_value).collect()),
        serde_json::Value::Object(obj) => Value::Object(
            obj.into_iter()
                .map(|(k, v)| (k, json_to_value(v)))
                .collect::<Document>(),
        ),
    }
}

/// Convert a document Value to serde_json::Value
///
/// Non-finite floats have no JSON representation and become `null`.
pub fn value_to_json(v: Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(b),
        Value::Integer(i) => serde_json::Value::Number(i.into()),
        Value::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s),
        Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(value_to_json).collect()),
        Value::Object(doc) => serde_json::Value::Object(
            doc.into_iter()
                .map(|(k, v)| (k, value_to_json(v)))
                .collect(),
        ),
    }
}

/// Convert a JSON object into a [`Document`]. Returns `None` for any other
/// JSON type.
pub fn json_to_document(v: serde_json::Value) -> Option<Document> {
    match json_to_value(v) {
        Value::Object(doc) => Some(doc),
        _ => None,
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        json_to_value(v)
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        value_to_json(v)
    }
}
