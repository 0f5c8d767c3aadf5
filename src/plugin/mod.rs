//! The format plugin contract.
//!
//! A format plugin converts between external content and the canonical
//! [`Value`] model. Plugins are selected by identifier through a
//! [`PluginRegistry`](crate::registry::PluginRegistry), never by runtime
//! type inspection.
//!
//! # Built-in plugins
//!
//! - [`JsonPlugin`]: JSON text (`application/json`, `json`)
//! - [`HostObjectPlugin`]: native Rust values (`application/x-rust-object`, `rust`)
//! - [`CsvPlugin`]: CSV tables (`application/csv`, `text/csv`, `csv`)
//!
//! # Implementing a plugin
//!
//! ```
//! use panformat::document::{Document, MediaType};
//! use panformat::error::FormatError;
//! use panformat::plugin::{FormatPlugin, Params};
//! use panformat::value::Value;
//!
//! struct Lines;
//!
//! impl FormatPlugin for Lines {
//!     fn plugin_id(&self) -> &str {
//!         "Lines"
//!     }
//!
//!     fn supported_identifiers(&self) -> &[&str] {
//!         &["text/plain", "lines"]
//!     }
//!
//!     fn read(&self, input: &Document, _params: &Params) -> Result<Value, FormatError> {
//!         Ok(input.to_text()?.lines().map(Value::from).collect())
//!     }
//!
//!     fn write(
//!         &self,
//!         value: &Value,
//!         _params: &Params,
//!         media_type: &MediaType,
//!     ) -> Result<Document, FormatError> {
//!         let lines: Vec<String> = value
//!             .as_array()
//!             .unwrap_or_default()
//!             .iter()
//!             .map(|line| line.as_str().map(str::to_string).unwrap_or_else(|| line.to_string()))
//!             .collect();
//!         Ok(Document::text(lines.join("\n"), media_type.clone()))
//!     }
//! }
//! ```

pub mod csv;
pub mod host;
pub mod json;
mod params;

use std::collections::BTreeMap;

use crate::document::{Document, MediaType};
use crate::error::FormatError;
use crate::value::Value;

pub use self::csv::CsvPlugin;
pub use host::{HostObjectPlugin, TargetType, TypeRegistry, OUTPUT_CLASS};
pub use json::JsonPlugin;
pub use params::Params;

/// Recognized parameter names mapped to human-readable descriptions.
pub type ParameterDocs = BTreeMap<String, String>;

/// Capability interface implemented by every data format.
///
/// Implementations must be stateless with respect to individual calls so a
/// single instance can serve concurrent reads and writes.
pub trait FormatPlugin: Send + Sync {
    /// Short stable name of the plugin (e.g. "JSON").
    fn plugin_id(&self) -> &str;

    /// Identifiers this plugin answers to; the first one is canonical.
    fn supported_identifiers(&self) -> &[&str];

    /// Parameters understood by [`read`](FormatPlugin::read).
    fn read_parameters(&self) -> ParameterDocs {
        ParameterDocs::new()
    }

    /// Parameters understood by [`write`](FormatPlugin::write).
    fn write_parameters(&self) -> ParameterDocs {
        ParameterDocs::new()
    }

    /// Reads external content into a canonical value.
    fn read(&self, input: &Document, params: &Params) -> Result<Value, FormatError>;

    /// Writes a canonical value into a new document tagged with `media_type`.
    fn write(
        &self,
        value: &Value,
        params: &Params,
        media_type: &MediaType,
    ) -> Result<Document, FormatError>;

    /// Whether scalars keep their kind through this format.
    ///
    /// Formats that carry every cell as text (CSV) return `false`; the
    /// conversion report flags them as lossy.
    fn preserves_scalar_kinds(&self) -> bool {
        true
    }

    /// The concrete representation `write` would produce for `value`, for
    /// plugins that choose one from the value and parameters.
    fn output_target(&self, _value: &Value, _params: &Params) -> Option<String> {
        None
    }

    /// The media type named by the canonical identifier.
    fn canonical_media_type(&self) -> Result<MediaType, FormatError> {
        let canonical = self.supported_identifiers().first().copied().unwrap_or("");
        MediaType::parse(canonical)
    }
}

/// Builds a [`ParameterDocs`] map from static pairs.
pub(crate) fn parameter_docs(entries: &[(&str, &str)]) -> ParameterDocs {
    entries
        .iter()
        .map(|(name, description)| (name.to_string(), description.to_string()))
        .collect()
}
