//! Caller-supplied read/write parameters.

use std::collections::BTreeMap;

use tracing::debug;

use super::ParameterDocs;
use crate::error::FormatError;
use crate::value::Value;

/// Parameters passed to a plugin's `read` or `write`.
///
/// Names are matched exactly. Plugins ignore names they do not declare.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params {
    entries: BTreeMap<String, Value>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns a string parameter; other value kinds are an error.
    pub fn get_str(&self, name: &str) -> Result<Option<&str>, FormatError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(FormatError::invalid_parameter(
                name,
                format!("expected a string, found {}", other.kind()),
            )),
        }
    }

    /// Returns a boolean parameter; accepts `true`/`false` strings too.
    pub fn get_bool(&self, name: &str) -> Result<Option<bool>, FormatError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(Some(true)),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(Some(false)),
            Some(other) => Err(FormatError::invalid_parameter(
                name,
                format!("expected a boolean, found {other}"),
            )),
        }
    }

    /// Returns a single-character string parameter.
    pub fn get_char(&self, name: &str) -> Result<Option<char>, FormatError> {
        let Some(s) = self.get_str(name)? else {
            return Ok(None);
        };
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Some(c)),
            _ => Err(FormatError::invalid_parameter(
                name,
                format!("expected a single character, found '{s}'"),
            )),
        }
    }

    /// Returns a list of strings, given as an array or a comma-separated string.
    pub fn get_string_list(&self, name: &str) -> Result<Option<Vec<String>>, FormatError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(
                s.split(',').map(|item| item.trim().to_string()).collect(),
            )),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        FormatError::invalid_parameter(
                            name,
                            format!("expected a list of strings, found {} item", item.kind()),
                        )
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(other) => Err(FormatError::invalid_parameter(
                name,
                format!("expected a list of strings, found {}", other.kind()),
            )),
        }
    }

    /// Logs parameters that `declared` does not list. They are ignored, not rejected.
    pub fn log_unrecognized(&self, plugin_id: &str, declared: &ParameterDocs) {
        for name in self.entries.keys().filter(|n| !declared.contains_key(*n)) {
            debug!(plugin = plugin_id, parameter = %name, "ignoring unrecognized parameter");
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}
