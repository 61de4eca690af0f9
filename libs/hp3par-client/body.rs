//! Response body handling
//!
//! The management API speaks JSON, but error pages and some endpoints return
//! plain text or nothing at all. Bodies are parsed leniently: valid JSON
//! becomes a [`serde_json::Value`], anything else is kept as raw bytes.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::borrow::Cow;

/// Parsed content of an HTTP response body
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResponseBody {
    /// No body was returned
    #[default]
    Empty,
    /// Well-formed JSON document
    Json(Value),
    /// Body that could not be decoded as JSON
    Raw(Vec<u8>),
}

impl ResponseBody {
    /// Parse raw response bytes
    ///
    /// An empty payload yields [`ResponseBody::Empty`]; malformed JSON is not
    /// an error and is passed through as [`ResponseBody::Raw`].
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return ResponseBody::Empty;
        }

        match serde_json::from_slice::<Value>(bytes) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Raw(bytes.to_vec()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ResponseBody::Empty)
    }

    /// Borrow the JSON document, if the body was JSON
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Look up a top-level field of a JSON object body
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.as_json().and_then(|value| value.get(field))
    }

    /// Lossy text view of the body, useful for logs and error messages
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            ResponseBody::Empty => Cow::Borrowed(""),
            ResponseBody::Json(value) => Cow::Owned(value.to_string()),
            ResponseBody::Raw(bytes) => String::from_utf8_lossy(bytes),
        }
    }

    /// Deserialize a JSON body into a typed value
    ///
    /// An empty body is treated as JSON `null`, so `Option<T>` targets
    /// decode to `None`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        match self {
            ResponseBody::Empty => serde_json::from_value(Value::Null),
            ResponseBody::Json(value) => serde_json::from_value(value.clone()),
            ResponseBody::Raw(bytes) => serde_json::from_slice(bytes),
        }
    }
}

impl std::fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseBody::Empty => write!(f, "<empty>"),
            other => write!(f, "{}", other.as_text()),
        }
    }
}
