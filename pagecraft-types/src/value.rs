//! Content values.
//!
//! The tag of a value is always supplied by the call site that stages it.
//! Nothing in the engine infers a tag from the shape of the data.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The tag of a [`ContentValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Text,
    RichText,
    Image,
    Json,
}

impl ValueKind {
    /// The storage name of the kind (`"text"`, `"richtext"`, ...).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::RichText => "richtext",
            Self::Image => "image",
            Self::Json => "json",
        }
    }

    /// Whether a stored value of kind `other` may be rendered where `self`
    /// is expected. Plain and rich text render the same way; everything
    /// else must match exactly.
    pub const fn accepts(self, other: ValueKind) -> bool {
        matches!(
            (self, other),
            (Self::Text | Self::RichText, Self::Text | Self::RichText)
                | (Self::Image, Self::Image)
                | (Self::Json, Self::Json)
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "richtext" | "rich_text" => Ok(Self::RichText),
            "image" => Ok(Self::Image),
            "json" => Ok(Self::Json),
            other => Err(crate::Error::UnknownKind(other.to_string())),
        }
    }
}

/// An overridable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ContentValue {
    Text(String),
    RichText(String),
    /// An image URL.
    Image(String),
    /// Arbitrary structured data, typically the array behind a repeater.
    Json(serde_json::Value),
}

impl ContentValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn rich_text(s: impl Into<String>) -> Self {
        Self::RichText(s.into())
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self::Image(url.into())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Text(_) => ValueKind::Text,
            Self::RichText(_) => ValueKind::RichText,
            Self::Image(_) => ValueKind::Image,
            Self::Json(_) => ValueKind::Json,
        }
    }

    /// True for values that must not hide a default: the empty string,
    /// and for Json `null`, `""`, `[]` and `{}`.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) | Self::RichText(s) | Self::Image(s) => s.is_empty(),
            Self::Json(v) => match v {
                serde_json::Value::Null => true,
                serde_json::Value::String(s) => s.is_empty(),
                serde_json::Value::Array(items) => items.is_empty(),
                serde_json::Value::Object(map) => map.is_empty(),
                _ => false,
            },
        }
    }

    /// The string payload of a textual or image value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::RichText(s) | Self::Image(s) => Some(s),
            Self::Json(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Builds a value of `kind` from the flat string a gateway stores.
    /// Json is parsed; every other kind takes the string as is.
    pub fn from_stored(kind: ValueKind, raw: &str) -> crate::Result<Self> {
        Ok(match kind {
            ValueKind::Text => Self::Text(raw.to_string()),
            ValueKind::RichText => Self::RichText(raw.to_string()),
            ValueKind::Image => Self::Image(raw.to_string()),
            ValueKind::Json => Self::Json(serde_json::from_str(raw)?),
        })
    }

    /// The flat string form used by [`ContentValue::from_stored`].
    pub fn to_stored(&self) -> String {
        match self {
            Self::Text(s) | Self::RichText(s) | Self::Image(s) => s.clone(),
            Self::Json(v) => v.to_string(),
        }
    }

    /// Coerces a Json leaf reached through a dotted field path into the
    /// expected kind. Strings become text or image values; other leaves are
    /// only usable where Json is expected.
    pub fn from_json_leaf(expected: ValueKind, leaf: &serde_json::Value) -> Option<Self> {
        match (expected, leaf) {
            (ValueKind::Json, v) => Some(Self::Json(v.clone())),
            (ValueKind::Text, serde_json::Value::String(s)) => Some(Self::Text(s.clone())),
            (ValueKind::RichText, serde_json::Value::String(s)) => Some(Self::RichText(s.clone())),
            (ValueKind::Image, serde_json::Value::String(s)) => Some(Self::Image(s.clone())),
            _ => None,
        }
    }
}
