//! JSON text primitives for the canonical model.
//!
//! These are the only JSON parse/serialize entry points in the crate. The
//! JSON plugin uses them directly, and the host-object plugin round-trips
//! through them on both read and write.

use super::Value;
use crate::error::FormatError;

const FORMAT: &str = "JSON";

/// Parses JSON text into a canonical value.
///
/// # Errors
/// Returns [`FormatError::Parse`] on malformed input; nothing is returned
/// for a partially valid document.
pub fn from_json_str(text: &str) -> Result<Value, FormatError> {
    serde_json::from_str::<serde_json::Value>(text)
        .map(Value::from)
        .map_err(|e| FormatError::parse(FORMAT, e))
}

/// Parses JSON bytes into a canonical value.
///
/// Useful for fuzzing and processing raw bytes without requiring UTF-8 upfront.
pub fn from_json_slice(bytes: &[u8]) -> Result<Value, FormatError> {
    serde_json::from_slice::<serde_json::Value>(bytes)
        .map(Value::from)
        .map_err(|e| FormatError::parse(FORMAT, e))
}

/// Serializes a canonical value as compact JSON text.
pub fn to_json_string(value: &Value) -> Result<String, FormatError> {
    serde_json::to_string(&serde_json::Value::from(value))
        .map_err(|e| FormatError::serialize(FORMAT, e))
}

/// Serializes a canonical value as indented JSON text.
pub fn to_json_string_pretty(value: &Value) -> Result<String, FormatError> {
    serde_json::to_string_pretty(&serde_json::Value::from(value))
        .map_err(|e| FormatError::serialize(FORMAT, e))
}
