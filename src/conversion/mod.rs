//! Conversion between formats through the canonical value model.
//!
//! A conversion resolves a reader and a writer in a [`PluginRegistry`],
//! reads the input document into a [`Value`], and writes that value out
//! again. Along the way it builds a [`ConversionReport`] describing what the
//! formats could not carry.

pub mod report;

pub use report::{
    ConversionIssue, ConversionIssueCode, ConversionReport, ConversionSeverity, ValueCounts,
};

use tracing::debug;

use crate::document::{Document, MediaType};
use crate::error::PanformatError;
use crate::plugin::{ParameterDocs, Params};
use crate::registry::{PluginDescriptor, PluginRegistry};
use crate::value::Value;

/// What to convert to, and how.
#[derive(Clone, Debug, Default)]
pub struct ConversionRequest {
    /// Reader identifier; defaults to the input document's media type.
    pub from: Option<String>,
    /// Writer identifier or full media type.
    pub to: String,
    pub read_params: Params,
    pub write_params: Params,
}

impl ConversionRequest {
    pub fn new(to: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            ..Default::default()
        }
    }

    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn with_read_params(mut self, params: Params) -> Self {
        self.read_params = params;
        self
    }

    pub fn with_write_params(mut self, params: Params) -> Self {
        self.write_params = params;
        self
    }
}

/// The output of a conversion.
#[derive(Debug)]
pub struct Conversion {
    pub document: Document,
    pub report: ConversionReport,
}

/// Reads a document with the plugin registered for `from` (or its own media type).
pub fn read_document(
    registry: &PluginRegistry,
    input: &Document,
    from: Option<&str>,
    params: &Params,
) -> Result<Value, PanformatError> {
    let from = from.unwrap_or_else(|| input.media_type().essence());
    let reader = registry.resolve(from)?;
    debug!(plugin = reader.plugin_id(), from, "reading document");
    Ok(reader.read(input, params)?)
}

/// Writes a value with the plugin registered for `to`.
///
/// When `to` is a full media type it tags the output as given; a short
/// identifier tags it with the plugin's canonical media type.
pub fn write_value(
    registry: &PluginRegistry,
    value: &Value,
    to: &str,
    params: &Params,
) -> Result<Document, PanformatError> {
    let descriptor = registry.descriptor(to)?;
    write_with(&descriptor, value, to, params)
}

fn write_with(
    descriptor: &PluginDescriptor,
    value: &Value,
    to: &str,
    params: &Params,
) -> Result<Document, PanformatError> {
    let media_type = if to.contains('/') {
        MediaType::parse(to)?
    } else {
        descriptor.plugin().canonical_media_type()?
    };
    debug!(plugin = descriptor.plugin_id(), %media_type, "writing document");
    Ok(descriptor.plugin().write(value, params, &media_type)?)
}

/// Converts a document from one format to another.
///
/// # Errors
/// Fails with [`PanformatError::UnsupportedFormat`] when either identifier is
/// unknown, and with [`PanformatError::Format`] when reading or writing fails.
/// No output is produced on failure.
pub fn convert(
    registry: &PluginRegistry,
    input: &Document,
    request: &ConversionRequest,
) -> Result<Conversion, PanformatError> {
    let from = request
        .from
        .as_deref()
        .unwrap_or_else(|| input.media_type().essence());
    let reader = registry.descriptor(from)?;
    let writer = registry.descriptor(&request.to)?;

    debug!(plugin = reader.plugin_id(), from, "reading document");
    let value = reader.plugin().read(input, &request.read_params)?;
    let document = write_with(&writer, &value, &request.to, &request.write_params)?;

    let mut report = ConversionReport::new(reader.plugin_id(), writer.plugin_id());
    report.media_type = document.media_type().to_string();
    report.counts = ValueCounts::of(&value);
    add_ignored_parameters(
        &mut report,
        &request.read_params,
        reader.read_parameters(),
        ConversionIssueCode::IgnoredReadParameter,
        reader.plugin_id(),
    );
    add_ignored_parameters(
        &mut report,
        &request.write_params,
        writer.write_parameters(),
        ConversionIssueCode::IgnoredWriteParameter,
        writer.plugin_id(),
    );
    analyze_reader(&mut report, &reader);
    analyze_writer(&mut report, &writer, &value, &request.write_params);

    Ok(Conversion { document, report })
}

fn add_ignored_parameters(
    report: &mut ConversionReport,
    params: &Params,
    declared: &ParameterDocs,
    code: ConversionIssueCode,
    plugin_id: &str,
) {
    for (name, _) in params.iter().filter(|(name, _)| !declared.contains_key(*name)) {
        report.add(ConversionIssue::info(
            code,
            format!("parameter '{name}' is not recognized by {plugin_id} and was ignored"),
        ));
    }
}

fn analyze_reader(report: &mut ConversionReport, reader: &PluginDescriptor) {
    if !reader.plugin().preserves_scalar_kinds() {
        report.add(ConversionIssue::warning(
            ConversionIssueCode::CellsReadAsStrings,
            format!(
                "{} cells are read as strings; numbers and booleans are not recovered",
                reader.plugin_id()
            ),
        ));
    }
}

fn analyze_writer(
    report: &mut ConversionReport,
    writer: &PluginDescriptor,
    value: &Value,
    params: &Params,
) {
    if !writer.plugin().preserves_scalar_kinds() {
        let stringified = count_non_string_scalars(value);
        if stringified > 0 {
            report.add(ConversionIssue::warning(
                ConversionIssueCode::ScalarsWrittenAsText,
                format!(
                    "{stringified} number/boolean/null value(s) written as {} text",
                    writer.plugin_id()
                ),
            ));
        }
    }
    if let Some(target) = writer.plugin().output_target(value, params) {
        report.add(ConversionIssue::info(
            ConversionIssueCode::HostTargetResolved,
            format!("{} root materialized as {target}", value.kind()),
        ));
    }
}

fn count_non_string_scalars(value: &Value) -> usize {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) => 1,
        Value::String(_) => 0,
        Value::Array(items) => items.iter().map(count_non_string_scalars).sum(),
        Value::Object(obj) => obj.values().map(count_non_string_scalars).sum(),
    }
}
