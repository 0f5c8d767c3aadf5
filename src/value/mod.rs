//! Canonical value model for panformat.
//!
//! Every format plugin reads external content into a [`Value`] and writes a
//! [`Value`] back out. The model is deliberately small: it is the JSON data
//! model, with two guarantees on top of it:
//!
//! 1. **Decimal-safe numbers**: a [`Number`] keeps the exact lexical form it
//!    was parsed from, so `12345678901234567890123` and `0.1000` survive a
//!    read/write cycle unchanged. `1` and `1.0` are different numbers.
//!
//! 2. **Ordered objects**: an [`Object`] iterates in insertion order, but two
//!    objects with the same entries in a different order are equal.
//!
//! There is no coercion between variants: `Value::from(1)` and
//! `Value::from("1")` are never equal.
//!
//! # Example
//!
//! ```
//! use panformat::value::{Object, Value};
//!
//! let mut manufacturer = Object::new();
//! manufacturer.insert("manufacturerName", "ACME Corp.");
//!
//! let value = Value::from(vec![Value::from(manufacturer), Value::Null]);
//! assert_eq!(value.to_string(), r#"[{"manufacturerName":"ACME Corp."},null]"#);
//! ```

pub mod json;
mod number;
mod object;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use number::Number;
pub use object::Object;

/// A fully resolved canonical value.
///
/// Values form a strict tree: each subtree is owned by its parent.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(Object),
}

/// The variant tag of a [`Value`], used in error messages and type resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        };
        f.write_str(name)
    }
}

impl Value {
    /// Creates a number value from a float; `None` for NaN and infinities.
    pub fn from_f64(n: f64) -> Option<Self> {
        Number::from_f64(n).map(Value::Number)
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Looks up a key when this value is an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|obj| obj.get(key))
    }
}

impl fmt::Display for Value {
    /// Formats the value as compact JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", serde_json::Value::from(self))
    }
}

// ============================================================================
// Construction
// ============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! value_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(Number::from(n))
                }
            }
        )*
    };
}

value_from_integer!(i32, i64, u32, u64);

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Object> for Value {
    fn from(obj: Object) -> Self {
        Value::Object(obj)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::Array(iter.into_iter().collect())
    }
}

// ============================================================================
// serde_json bridge
// ============================================================================

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(Number::from(n)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone().into()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            Value::Object(obj) => serde_json::Value::Object(
                obj.iter()
                    .map(|(key, value)| (key.to_string(), serde_json::Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        serde_json::Value::from(&value)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde_json::Value::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_coercion_between_variants() {
        assert_ne!(Value::from(1), Value::from("1"));
        assert_ne!(Value::from(true), Value::from("true"));
        assert_ne!(Value::Null, Value::from(""));
        assert_ne!(Value::Array(vec![]), Value::Object(Object::new()));
    }

    #[test]
    fn test_object_equality_ignores_key_order() {
        let a: Object = [("x", Value::from(1)), ("y", Value::from(2))]
            .into_iter()
            .collect();
        let b: Object = [("y", Value::from(2)), ("x", Value::from(1))]
            .into_iter()
            .collect();

        assert_eq!(Value::from(a.clone()), Value::from(b.clone()));
        assert_eq!(a.keys().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(b.keys().collect::<Vec<_>>(), vec!["y", "x"]);
    }

    #[test]
    fn test_array_equality_respects_order() {
        let a = Value::from(vec![Value::from(1), Value::from(2)]);
        let b = Value::from(vec![Value::from(2), Value::from(1)]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_kind() {
        assert_eq!(Value::Null.kind(), ValueKind::Null);
        assert_eq!(Value::from(false).kind(), ValueKind::Bool);
        assert_eq!(Value::from(3u64).kind(), ValueKind::Number);
        assert_eq!(Value::from("s").kind(), ValueKind::String);
        assert_eq!(Value::Array(vec![]).kind(), ValueKind::Array);
        assert_eq!(Value::Object(Object::new()).kind(), ValueKind::Object);
        assert_eq!(ValueKind::Bool.to_string(), "boolean");
    }

    #[test]
    fn test_from_f64_rejects_non_finite() {
        assert!(Value::from_f64(f64::NAN).is_none());
        assert!(Value::from_f64(f64::INFINITY).is_none());
        assert_eq!(Value::from_f64(2.5).unwrap().to_string(), "2.5");
    }

    #[test]
    fn test_serde_json_bridge_preserves_order_and_numbers() {
        let raw: serde_json::Value =
            serde_json::from_str(r#"{"b":1.50,"a":[null,true,"s"],"big":123456789012345678901234}"#)
                .unwrap();
        let value = Value::from(raw.clone());

        assert_eq!(
            value.as_object().unwrap().keys().collect::<Vec<_>>(),
            vec!["b", "a", "big"]
        );
        assert_eq!(value.get("b").unwrap().to_string(), "1.50");
        assert_eq!(serde_json::Value::from(&value), raw);
    }

    #[test]
    fn test_display_is_compact_json() {
        let mut obj = Object::new();
        obj.insert("name", "gizmo");
        obj.insert("tags", Value::from(vec![Value::from("a")]));
        assert_eq!(
            Value::from(obj).to_string(),
            r#"{"name":"gizmo","tags":["a"]}"#
        );
    }
}
