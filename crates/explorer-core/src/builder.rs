//! Resolve an operation plus user input into a transport-ready request

use indexmap::IndexMap;
use openapi_catalog::{OperationDefinition, ParameterLocation};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::debug;

use crate::error::ValidationError;
use crate::types::{ParameterValues, PreparedRequest};

const CONTENT_TYPE: &str = "Content-Type";
const APPLICATION_JSON: &str = "application/json";

/// Matches a leading URI scheme such as `https:` or `mailto:`
fn scheme_regex() -> &'static Regex {
    static SCHEME: OnceLock<Regex> = OnceLock::new();
    SCHEME.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("valid scheme pattern"))
}

/// Builds [`PreparedRequest`]s. Pure: no I/O happens here, and nothing is
/// returned unless every validation passed.
pub struct RequestBuilder;

impl RequestBuilder {
    /// Resolve URL, query string, headers and body for an operation
    pub fn build(
        operation: &OperationDefinition,
        values: &ParameterValues,
        raw_body: &str,
        base_url: &str,
    ) -> Result<PreparedRequest, ValidationError> {
        let path = Self::substitute_path(operation, values)?;
        let path = Self::append_query(operation, values, path);
        let mut headers = Self::collect_headers(operation, values);

        let body = if operation.has_json_body() {
            let body = Self::normalize_body(raw_body)?;
            // The body's content type wins over a header parameter of the same name
            headers.retain(|name, _| !name.eq_ignore_ascii_case(CONTENT_TYPE));
            headers.insert(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string());
            Some(body)
        } else {
            None
        };

        let url = Self::resolve_url(base_url, &path);
        debug!("Built {} {}", operation.method, url);

        Ok(PreparedRequest {
            url,
            method: operation.method.as_str().to_string(),
            headers,
            body,
        })
    }

    /// Fill every `{name}` slot; a path parameter without a value aborts
    fn substitute_path(
        operation: &OperationDefinition,
        values: &ParameterValues,
    ) -> Result<String, ValidationError> {
        let mut path = operation.path.clone();
        for param in operation.parameters_in(ParameterLocation::Path) {
            let value = Self::value_of(values, &param.name)
                .ok_or_else(|| ValidationError::MissingRequiredParameter(param.name.clone()))?;
            path = path.replace(&format!("{{{}}}", param.name), &urlencoding::encode(value));
        }
        Ok(path)
    }

    /// Append `name=value` pairs for query parameters that have a value
    fn append_query(operation: &OperationDefinition, values: &ParameterValues, path: String) -> String {
        let pairs: Vec<String> = operation
            .parameters_in(ParameterLocation::Query)
            .filter_map(|param| {
                Self::value_of(values, &param.name).map(|value| {
                    format!("{}={}", urlencoding::encode(&param.name), urlencoding::encode(value))
                })
            })
            .collect();

        if pairs.is_empty() {
            return path;
        }

        let separator = if path.contains('?') { '&' } else { '?' };
        format!("{}{}{}", path, separator, pairs.join("&"))
    }

    /// Header parameters with a value, set verbatim
    fn collect_headers(operation: &OperationDefinition, values: &ParameterValues) -> IndexMap<String, String> {
        operation
            .parameters_in(ParameterLocation::Header)
            .filter_map(|param| {
                Self::value_of(values, &param.name).map(|value| (param.name.clone(), value.to_string()))
            })
            .collect()
    }

    /// Parse and re-serialize the body, which also rejects trailing garbage
    fn normalize_body(raw_body: &str) -> Result<String, ValidationError> {
        let parsed: Value = serde_json::from_str(raw_body)
            .map_err(|e| ValidationError::InvalidBodyJson(e.to_string()))?;
        serde_json::to_string(&parsed).map_err(|e| ValidationError::InvalidBodyJson(e.to_string()))
    }

    /// Absolute URLs pass through; relative paths are joined to the base with one `/`
    fn resolve_url(base_url: &str, path: &str) -> String {
        if scheme_regex().is_match(path) {
            return path.to_string();
        }
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// A value counts only when present and non-empty
    fn value_of<'v>(values: &'v ParameterValues, name: &str) -> Option<&'v str> {
        values.get(name).map(String::as_str).filter(|v| !v.is_empty())
    }
}
