//! JSON format plugin.
//!
//! The reference implementation of the plugin contract: JSON text in, JSON
//! text out, no parameters.

use super::{FormatPlugin, ParameterDocs, Params};
use crate::document::{Document, MediaType};
use crate::error::FormatError;
use crate::value::json::{from_json_str, to_json_string};
use crate::value::Value;

/// Reads and writes JSON text.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonPlugin;

impl JsonPlugin {
    pub fn new() -> Self {
        JsonPlugin
    }
}

impl FormatPlugin for JsonPlugin {
    fn plugin_id(&self) -> &str {
        "JSON"
    }

    fn supported_identifiers(&self) -> &[&str] {
        &["application/json", "json"]
    }

    fn read(&self, input: &Document, params: &Params) -> Result<Value, FormatError> {
        params.log_unrecognized(self.plugin_id(), &ParameterDocs::new());
        from_json_str(&input.to_text()?)
    }

    fn write(
        &self,
        value: &Value,
        params: &Params,
        media_type: &MediaType,
    ) -> Result<Document, FormatError> {
        params.log_unrecognized(self.plugin_id(), &ParameterDocs::new());
        Ok(Document::text(to_json_string(value)?, media_type.clone()))
    }
}
