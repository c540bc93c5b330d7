//! Request and response records

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// User-entered parameter values of the selected operation, keyed by name
pub type ParameterValues = IndexMap<String, String>;

/// A fully resolved, transport-ready request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedRequest {
    /// Absolute URL including the query string
    pub url: String,
    /// Upper-case HTTP method
    pub method: String,
    /// Header name → value, in insertion order
    pub headers: IndexMap<String, String>,
    /// Request body
    pub body: Option<String>,
}

impl PreparedRequest {
    /// A body-less GET
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            headers: IndexMap::new(),
            body: None,
        }
    }

    /// Add a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Normalized result of an executed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    /// HTTP status code
    pub status: u16,
    /// Status in 200..=299
    pub ok: bool,
    /// Response headers; repeated names are joined with ", "
    pub headers: IndexMap<String, String>,
    /// Time spent in the transport, in milliseconds
    pub elapsed_ms: u64,
    /// Body text, always kept
    pub body_raw: String,
    /// Body parsed as JSON, when it is JSON
    pub body_parsed: Option<Value>,
}

impl ResponseRecord {
    /// Body for display: pretty JSON when parsed, raw text otherwise
    pub fn display_body(&self) -> String {
        self.body_parsed
            .as_ref()
            .and_then(|json| serde_json::to_string_pretty(json).ok())
            .unwrap_or_else(|| self.body_raw.clone())
    }
}
