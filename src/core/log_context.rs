//! Structured extra attributes carried by a log record
//!
//! This module provides:
//! - `FieldValue`: a single attribute value, always encodable as JSON
//! - `LogContext`: the named attributes attached to one record

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::{self, Write};

/// Placeholder used when a value has neither a JSON form nor a text form
pub fn non_serializable(type_name: &str) -> String {
    format!("<non-serializable: {}>", type_name)
}

/// Unqualified name of `T` (`std::fs::File` becomes `File`)
pub(crate) fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

/// A value with no JSON representation
///
/// Holds the value's type name and, when one could be produced, a text
/// rendering of it.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueValue {
    type_name: String,
    text: Option<String>,
}

impl OpaqueValue {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn render(&self) -> String {
        self.text
            .clone()
            .unwrap_or_else(|| non_serializable(&self.type_name))
    }
}

/// Value type for structured logging fields
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    /// Arbitrary JSON tree, usually a decoded payload
    Json(serde_json::Value),
    Opaque(OpaqueValue),
}

impl FieldValue {
    /// Encode `value` through serde
    ///
    /// A value whose `Serialize` impl fails becomes an opaque value without
    /// text, which renders as `<non-serializable: TypeName>`.
    pub fn serialized<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(json) => FieldValue::Json(json),
            Err(_) => Self::opaque(value),
        }
    }

    /// Keep the `Display` text of a value that has no JSON form
    pub fn displayed<T: fmt::Display + ?Sized>(value: &T) -> Self {
        let mut text = String::new();
        let text = match write!(text, "{}", value) {
            Ok(()) => Some(text),
            Err(_) => None,
        };
        FieldValue::Opaque(OpaqueValue {
            type_name: short_type_name::<T>(),
            text,
        })
    }

    /// Record only the type of a value, e.g. an open file or socket
    pub fn opaque<T: ?Sized>(_value: &T) -> Self {
        FieldValue::Opaque(OpaqueValue {
            type_name: short_type_name::<T>(),
            text: None,
        })
    }

    /// Structural encode first, text conversion second, placeholder last
    pub fn lossy<T: Serialize + fmt::Display + ?Sized>(value: &T) -> Self {
        match Self::serialized(value) {
            FieldValue::Opaque(_) => Self::displayed(value),
            encoded => encoded,
        }
    }

    /// Convert to serde_json::Value for JSON serialization
    ///
    /// Never fails: opaque values become their text or a placeholder.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Int(i) => serde_json::Value::Number((*i).into()),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(f.to_string())),
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Null => serde_json::Value::Null,
            FieldValue::Json(value) => value.clone(),
            FieldValue::Opaque(opaque) => serde_json::Value::String(opaque.render()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Null => write!(f, "null"),
            FieldValue::Json(serde_json::Value::String(s)) => write!(f, "{}", s),
            FieldValue::Json(value) => write!(f, "{}", value),
            FieldValue::Opaque(opaque) => write!(f, "{}", opaque.render()),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_value().serialize(serializer)
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i64::from(i))
    }
}

impl From<u32> for FieldValue {
    fn from(i: u32) -> Self {
        FieldValue::Int(i64::from(i))
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        FieldValue::Json(value)
    }
}

/// Named extra attributes of a single log record
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LogContext {
    fields: BTreeMap<String, FieldValue>,
}

impl LogContext {
    /// Create a new empty log context
    pub fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// Add a field to the context
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Copy every field of `other` into this context, overwriting duplicates
    pub fn merge(&mut self, other: LogContext) {
        self.fields.extend(other.fields);
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Get all fields
    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if context has any fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Format fields as key=value pairs
    pub fn format_fields(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Fields as a JSON object; opaque values are already rendered
    pub fn to_json_map(&self) -> serde_json::Map<String, serde_json::Value> {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json_value()))
            .collect()
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_fields())
    }
}
