//! Runtime value type for stored rows.
//!
//! [`Value`] is the opaque payload an embedding application attaches to a
//! row. It supports all JSON-compatible types plus binary data, and is what
//! the engine serializes into the durable backing store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Generic runtime value type for row payloads.
///
/// Supports all JSON-compatible types plus binary data. The derive's
/// externally-tagged representation is kept on purpose: it round-trips
/// `Bytes` and the `Int`/`Float` distinction losslessly through JSON text,
/// which the durable format requires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// JSON null.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON integer (signed 64-bit).
    Int(i64),
    /// JSON floating-point (64-bit IEEE 754).
    Float(f64),
    /// JSON string (UTF-8).
    String(String),
    /// Binary data (not directly representable in JSON).
    Bytes(Vec<u8>),
    /// JSON array (ordered sequence of values).
    Array(Vec<Value>),
    /// JSON object (ordered map of string keys to values).
    /// Uses `BTreeMap` for deterministic serialization order.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Returns the string payload if this is a `String` value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer payload if this is an `Int` value.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns `true` if this is `Value::Null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Converts a `serde_json::Value` into a [`Value`].
    ///
    /// Numbers that fit an `i64` become `Int`; all other numbers become
    /// `Float`. There is no JSON representation for `Bytes`, so the reverse
    /// of [`Value::into_json`] maps byte arrays to number arrays.
    #[must_use]
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Float(n.as_f64().unwrap_or(f64::NAN)), Self::Int),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Converts this value into a plain (untagged) `serde_json::Value`.
    ///
    /// `Bytes` becomes an array of numbers. Non-finite floats become null,
    /// since JSON has no representation for them.
    #[must_use]
    pub fn into_json(self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(b),
            Self::Int(n) => serde_json::Value::from(n),
            Self::Float(f) => serde_json::Number::from_f64(f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::String(s) => serde_json::Value::String(s),
            Self::Bytes(bytes) => {
                serde_json::Value::Array(bytes.into_iter().map(serde_json::Value::from).collect())
            }
            Self::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(Self::into_json).collect())
            }
            Self::Map(entries) => serde_json::Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, v.into_json()))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_json_round_trip_preserves_every_variant() {
        let values = vec![
            Value::Null,
            Value::Bool(true),
            Value::Int(-42),
            Value::Float(1.5),
            Value::String("hello".to_string()),
            Value::Bytes(vec![0, 255, 7]),
            Value::Array(vec![Value::Int(1), Value::String("x".to_string())]),
            Value::Map(BTreeMap::from([("k".to_string(), Value::Bool(false))])),
        ];

        for value in values {
            let text = serde_json::to_string(&value).unwrap();
            let back: Value = serde_json::from_str(&text).unwrap();
            assert_eq!(back, value);
        }
    }

    #[test]
    fn int_and_float_stay_distinct_through_serialization() {
        let int_text = serde_json::to_string(&Value::Int(1)).unwrap();
        let float_text = serde_json::to_string(&Value::Float(1.0)).unwrap();
        assert_ne!(int_text, float_text);
    }

    #[test]
    fn from_json_maps_numbers_to_int_when_possible() {
        assert_eq!(Value::from_json(serde_json::json!(7)), Value::Int(7));
        assert_eq!(Value::from_json(serde_json::json!(7.5)), Value::Float(7.5));
    }

    #[test]
    fn json_bridge_round_trips_json_representable_values() {
        let json = serde_json::json!({
            "name": "session",
            "count": 3,
            "flags": [true, false],
            "nested": { "ratio": 0.25 }
        });
        assert_eq!(Value::from_json(json.clone()).into_json(), json);
    }

    #[test]
    fn conversions_from_primitives() {
        assert_eq!(Value::from("abc"), Value::String("abc".to_string()));
        assert_eq!(Value::from(5_i64), Value::Int(5));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(vec![1_u8, 2]), Value::Bytes(vec![1, 2]));
    }

    #[test]
    fn accessors() {
        assert_eq!(Value::from("abc").as_str(), Some("abc"));
        assert_eq!(Value::Int(3).as_int(), Some(3));
        assert!(Value::Null.is_null());
        assert!(Value::Bool(false).as_str().is_none());
    }
}
