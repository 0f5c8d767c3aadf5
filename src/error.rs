use thiserror::Error;

use crate::value::ValueKind;

/// Failure to read or write content in a declared format.
///
/// Plugins wrap every collaborator failure (serde_json, csv, serde) in one
/// of these variants. Host-object failures keep the serde_json error as the
/// source; parse and serialize failures keep its message.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Failed to parse {format} input: {message}")]
    Parse { format: String, message: String },

    #[error("Failed to serialize value as {format}: {message}")]
    Serialize { format: String, message: String },

    #[error("Failed to serialize host object of type {type_name}: {source}")]
    HostSerialize {
        type_name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to materialize value as {target}: {source}")]
    Materialize {
        target: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown output type '{name}' (registered: {known})")]
    UnknownType { name: String, known: String },

    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    #[error("Invalid media type '{0}'")]
    InvalidMediaType(String),

    #[error("Document with media type {media_type} has no textual form")]
    NotText { media_type: String },

    #[error("Document with media type {media_type} does not carry a host object")]
    NotHostObject { media_type: String },

    #[error("{format} cannot represent {kind} values{context}")]
    Unsupported {
        format: String,
        kind: ValueKind,
        context: String,
    },
}

impl FormatError {
    pub(crate) fn parse(format: &str, message: impl ToString) -> Self {
        FormatError::Parse {
            format: format.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn serialize(format: &str, message: impl ToString) -> Self {
        FormatError::Serialize {
            format: format.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn invalid_parameter(name: &str, message: impl Into<String>) -> Self {
        FormatError::InvalidParameter {
            name: name.to_string(),
            message: message.into(),
        }
    }
}

/// No plugin is registered for the requested identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported format: '{identifier}' (registered: {registered})")]
pub struct UnsupportedFormatError {
    pub identifier: String,
    pub registered: String,
}

/// The main error type for panformat operations.
#[derive(Debug, Error)]
pub enum PanformatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    UnsupportedFormat(#[from] UnsupportedFormatError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Cannot print document of type {media_type}: it holds a host object")]
    UnprintableDocument { media_type: String },
}
