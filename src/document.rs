//! Documents: content paired with a declared media type.
//!
//! A [`Document`] is what crosses the boundary between panformat and the
//! outside world. Callers wrap raw input in a document before a plugin reads
//! it, and plugins return a new document from every write. Documents are
//! never mutated in place.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use crate::error::FormatError;

// ============================================================================
// Media types
// ============================================================================

/// A parsed media type such as `application/json; charset=UTF-8`.
///
/// Short identifiers without a slash (`json`, `csv`) are accepted as an
/// essence so they can travel through the same channel as full mime types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaType {
    essence: String,
    parameters: Vec<(String, String)>,
}

impl MediaType {
    /// Parses a media type string.
    ///
    /// # Errors
    /// Returns [`FormatError::InvalidMediaType`] when the essence is empty or
    /// a parameter is not of the form `name=value`.
    pub fn parse(raw: &str) -> Result<Self, FormatError> {
        let mut parts = raw.split(';');
        let essence = parts.next().unwrap_or_default().trim();
        if essence.is_empty() || essence.contains(char::is_whitespace) {
            return Err(FormatError::InvalidMediaType(raw.to_string()));
        }

        let mut parameters = Vec::new();
        for part in parts {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (name, value) = part
                .split_once('=')
                .ok_or_else(|| FormatError::InvalidMediaType(raw.to_string()))?;
            let name = name.trim().to_ascii_lowercase();
            if name.is_empty() {
                return Err(FormatError::InvalidMediaType(raw.to_string()));
            }
            let value = value.trim().trim_matches('"').to_string();
            parameters.push((name, value));
        }

        Ok(Self {
            essence: essence.to_string(),
            parameters,
        })
    }

    /// The `type/subtype` part, without parameters, as written.
    pub fn essence(&self) -> &str {
        &self.essence
    }

    /// Looks up a parameter by case-insensitive name.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn parameters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parameters.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.essence)?;
        for (name, value) in &self.parameters {
            write!(f, "; {name}={value}")?;
        }
        Ok(())
    }
}

impl FromStr for MediaType {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaType::parse(s)
    }
}

// ============================================================================
// Host objects
// ============================================================================

type ErasedToJson = fn(&(dyn Any + Send + Sync)) -> Result<String, serde_json::Error>;

/// An opaque, shareable native Rust value.
///
/// The JSON serializer for the concrete type is captured at construction,
/// which is what lets the host-object plugin read an object back into the
/// canonical model without knowing its type.
#[derive(Clone)]
pub struct HostObject {
    type_name: String,
    inner: Arc<dyn Any + Send + Sync>,
    to_json: ErasedToJson,
}

impl HostObject {
    /// Wraps a value, naming it after its Rust type.
    pub fn new<T>(value: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Self::named(std::any::type_name::<T>(), value)
    }

    /// Wraps a value under an explicit type name.
    pub fn named<T>(type_name: impl Into<String>, value: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Self {
            type_name: type_name.into(),
            inner: Arc::new(value),
            to_json: erased_to_json::<T>,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        (*self.inner).is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.inner).downcast_ref::<T>()
    }

    /// Takes shared ownership of the concrete value.
    pub fn downcast<T: Any + Send + Sync>(self) -> Result<Arc<T>, Self> {
        let Self {
            type_name,
            inner,
            to_json,
        } = self;
        inner.downcast::<T>().map_err(|inner| Self {
            type_name,
            inner,
            to_json,
        })
    }

    /// Serializes the wrapped value to JSON text.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        (self.to_json)(&*self.inner)
    }
}

fn erased_to_json<T: Serialize + 'static>(
    any: &(dyn Any + Send + Sync),
) -> Result<String, serde_json::Error> {
    match any.downcast_ref::<T>() {
        Some(value) => serde_json::to_string(value),
        None => Err(serde::ser::Error::custom(format!(
            "host object is not a {}",
            std::any::type_name::<T>()
        ))),
    }
}

impl fmt::Debug for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostObject")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Documents
// ============================================================================

/// What a document carries.
#[derive(Clone, Debug)]
pub enum Content {
    Text(String),
    Binary(Vec<u8>),
    Object(HostObject),
}

/// Content plus its declared media type.
#[derive(Clone, Debug)]
pub struct Document {
    content: Content,
    media_type: MediaType,
}

impl Document {
    pub fn new(content: Content, media_type: MediaType) -> Self {
        Self {
            content,
            media_type,
        }
    }

    pub fn text(text: impl Into<String>, media_type: MediaType) -> Self {
        Self::new(Content::Text(text.into()), media_type)
    }

    pub fn binary(bytes: impl Into<Vec<u8>>, media_type: MediaType) -> Self {
        Self::new(Content::Binary(bytes.into()), media_type)
    }

    pub fn object(object: HostObject, media_type: MediaType) -> Self {
        Self::new(Content::Object(object), media_type)
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    pub fn into_content(self) -> Content {
        self.content
    }

    /// Returns the text when this is a text document.
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            Content::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn host_object(&self) -> Option<&HostObject> {
        match &self.content {
            Content::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Coerces the content to text.
    ///
    /// Binary content must be valid UTF-8. Host objects have no textual form.
    pub fn to_text(&self) -> Result<Cow<'_, str>, FormatError> {
        match &self.content {
            Content::Text(text) => Ok(Cow::Borrowed(text)),
            Content::Binary(bytes) => std::str::from_utf8(bytes)
                .map(Cow::Borrowed)
                .map_err(|e| FormatError::parse(self.media_type.essence(), e)),
            Content::Object(_) => Err(FormatError::NotText {
                media_type: self.media_type.to_string(),
            }),
        }
    }

    /// Returns a new document with the same content under another media type.
    pub fn with_media_type(&self, media_type: MediaType) -> Self {
        Self::new(self.content.clone(), media_type)
    }
}
