//! Host-object format plugin and output type resolution.
//!
//! This plugin converts between the canonical model and live Rust values.
//! Both directions go through JSON text: reading serializes the host object
//! with serde_json and parses the text into a [`Value`]; writing serializes
//! the value and deserializes the text into a concrete Rust type.
//!
//! # Type Resolution
//!
//! The canonical model only knows six shapes, so the output type is chosen
//! from the *root* node, in this order:
//!
//! | Root      | `OutputClass` | Target type                                  |
//! |-----------|---------------|----------------------------------------------|
//! | object    | present       | the type registered under that name          |
//! | object    | absent        | `serde_json::Map<String, serde_json::Value>` |
//! | array     | ignored       | `Vec<serde_json::Value>`                     |
//! | string    | ignored       | `String`                                     |
//! | boolean   | ignored       | `bool`                                       |
//! | number    | ignored       | `serde_json::Number` (lexical, unbounded)    |
//! | null      | ignored       | `()`                                         |
//!
//! Nested fields are typed by the target type's own fields; there are no
//! per-node overrides.
//!
//! Named types come from a [`TypeRegistry`] built by the embedding
//! application. Nothing is loaded by name at runtime beyond that registry.

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::{parameter_docs, FormatPlugin, ParameterDocs, Params};
use crate::document::{Document, HostObject, MediaType};
use crate::error::FormatError;
use crate::value::json::{from_json_str, to_json_string};
use crate::value::{Value, ValueKind};

/// Write parameter naming the registered output type.
pub const OUTPUT_CLASS: &str = "OutputClass";

type Materializer = fn(&str, &str) -> Result<HostObject, serde_json::Error>;

fn materialize<T>(type_name: &str, json: &str) -> Result<HostObject, serde_json::Error>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    serde_json::from_str::<T>(json).map(|value| HostObject::named(type_name, value))
}

// ============================================================================
// Type registry
// ============================================================================

/// Named output types available to the `OutputClass` parameter.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, Materializer>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` under `name`. A later registration under the same name wins.
    pub fn register<T>(&mut self, name: impl Into<String>) -> &mut Self
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let name = name.into();
        if self.types.insert(name.clone(), materialize::<T>).is_some() {
            debug!(type_name = %name, "replaced registered output type");
        }
        self
    }

    /// Registers `T` under `name`, builder style.
    pub fn with_type<T>(mut self, name: impl Into<String>) -> Self
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.register::<T>(name);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.types.keys().cloned().collect();
        names.sort();
        names
    }

    fn materialize(&self, name: &str, json: &str) -> Result<HostObject, FormatError> {
        let build = self
            .types
            .get(name)
            .ok_or_else(|| FormatError::UnknownType {
                name: name.to_string(),
                known: self.names().join(", "),
            })?;
        build(name, json).map_err(|source| FormatError::Materialize {
            target: name.to_string(),
            source,
        })
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.names())
            .finish()
    }
}

// ============================================================================
// Target types
// ============================================================================

/// The Rust type a canonical value is materialized into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetType {
    /// A type registered in the [`TypeRegistry`].
    Named(String),
    /// `serde_json::Map<String, serde_json::Value>`, insertion ordered.
    Map,
    /// `Vec<serde_json::Value>`.
    List,
    String,
    Bool,
    /// `serde_json::Number`, keeping the lexical form.
    Number,
    /// `()`, the representation of a null root.
    Unit,
}

impl TargetType {
    /// Selects the target type from the root shape of `value`.
    ///
    /// # Errors
    /// Returns [`FormatError::InvalidParameter`] when `OutputClass` is present
    /// on an object root but is not a string.
    pub fn resolve(value: &Value, params: &Params) -> Result<Self, FormatError> {
        let kind = value.kind();
        if kind != ValueKind::Object && params.contains(OUTPUT_CLASS) {
            debug!(root = %kind, "OutputClass only applies to object roots; ignoring");
        }

        Ok(match kind {
            ValueKind::Object => match params.get_str(OUTPUT_CLASS)? {
                Some(name) => TargetType::Named(name.to_string()),
                None => TargetType::Map,
            },
            ValueKind::Array => TargetType::List,
            ValueKind::String => TargetType::String,
            ValueKind::Bool => TargetType::Bool,
            ValueKind::Number => TargetType::Number,
            ValueKind::Null => TargetType::Unit,
        })
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetType::Named(name) => f.write_str(name),
            TargetType::Map => f.write_str("serde_json::Map<String, serde_json::Value>"),
            TargetType::List => f.write_str("Vec<serde_json::Value>"),
            TargetType::String => f.write_str("String"),
            TargetType::Bool => f.write_str("bool"),
            TargetType::Number => f.write_str("serde_json::Number"),
            TargetType::Unit => f.write_str("()"),
        }
    }
}

// ============================================================================
// Plugin
// ============================================================================

/// Reads and writes native Rust values wrapped in [`HostObject`]s.
#[derive(Clone, Debug, Default)]
pub struct HostObjectPlugin {
    types: TypeRegistry,
}

impl HostObjectPlugin {
    /// A plugin with no named types; only the default targets are available.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_types(types: TypeRegistry) -> Self {
        Self { types }
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    fn instantiate(&self, target: &TargetType, json: &str) -> Result<HostObject, FormatError> {
        let built = match target {
            TargetType::Named(name) => return self.types.materialize(name, json),
            TargetType::Map => {
                serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(json)
                    .map(HostObject::new)
            }
            TargetType::List => {
                serde_json::from_str::<Vec<serde_json::Value>>(json).map(HostObject::new)
            }
            TargetType::String => serde_json::from_str::<String>(json).map(HostObject::new),
            TargetType::Bool => serde_json::from_str::<bool>(json).map(HostObject::new),
            TargetType::Number => {
                serde_json::from_str::<serde_json::Number>(json).map(HostObject::new)
            }
            TargetType::Unit => serde_json::from_str::<()>(json).map(HostObject::new),
        };
        built.map_err(|source| FormatError::Materialize {
            target: target.to_string(),
            source,
        })
    }
}

impl FormatPlugin for HostObjectPlugin {
    fn plugin_id(&self) -> &str {
        "Rust"
    }

    fn supported_identifiers(&self) -> &[&str] {
        &["application/x-rust-object", "rust-object", "rust"]
    }

    fn write_parameters(&self) -> ParameterDocs {
        parameter_docs(&[(OUTPUT_CLASS, "Registered type name of the output object")])
    }

    fn output_target(&self, value: &Value, params: &Params) -> Option<String> {
        TargetType::resolve(value, params)
            .ok()
            .map(|target| target.to_string())
    }

    fn read(&self, input: &Document, params: &Params) -> Result<Value, FormatError> {
        params.log_unrecognized(self.plugin_id(), &self.read_parameters());
        let object = input
            .host_object()
            .ok_or_else(|| FormatError::NotHostObject {
                media_type: input.media_type().to_string(),
            })?;
        let json = object
            .to_json_string()
            .map_err(|source| FormatError::HostSerialize {
                type_name: object.type_name().to_string(),
                source,
            })?;
        from_json_str(&json)
    }

    fn write(
        &self,
        value: &Value,
        params: &Params,
        media_type: &MediaType,
    ) -> Result<Document, FormatError> {
        params.log_unrecognized(self.plugin_id(), &self.write_parameters());
        let json = to_json_string(value)?;
        let target = TargetType::resolve(value, params)?;
        debug!(%target, "materializing host object");
        let object = self.instantiate(&target, &json)?;
        Ok(Document::object(object, media_type.clone()))
    }
}
