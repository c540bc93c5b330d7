//! Operation extraction from OpenAPI path items

use crate::types::*;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Media type of the only request bodies the explorer knows how to send
const JSON_MEDIA_TYPE: &str = "application/json";

/// Extracts operations from raw OpenAPI path items
pub struct OperationExtractor;

impl OperationExtractor {
    /// Extract every operation of a path item, in document key order.
    ///
    /// Keys that are not HTTP verbs (shared `parameters`, `summary`, vendor
    /// extensions, ...) are skipped.
    pub fn extract_path_item(path: &str, path_item: &Value) -> Vec<OperationDefinition> {
        let Some(item) = path_item.as_object() else {
            warn!("Path item for {} is not an object, skipping", path);
            return Vec::new();
        };

        // Path-level parameters apply to every operation under this path
        let path_params = Self::convert_parameters(item.get("parameters"));

        let mut operations = Vec::new();
        for (key, operation) in item {
            let Some(method) = HttpMethod::from_key(key) else {
                continue;
            };

            match operation.as_object() {
                Some(op) => operations.push(Self::extract_operation(path, method, op, &path_params)),
                None => warn!("Operation {} {} is not an object, skipping", method, path),
            }
        }

        operations
    }

    /// Extract a single operation
    fn extract_operation(
        path: &str,
        method: HttpMethod,
        operation: &Map<String, Value>,
        path_params: &[ParameterDescriptor],
    ) -> OperationDefinition {
        let operation_id = Self::non_empty_str(operation, "operationId");
        let summary = Self::display_summary(
            Self::non_empty_str(operation, "summary").as_deref(),
            operation_id.as_deref(),
            method,
            path,
        );

        // Combine path-level and operation-level parameters
        let mut parameters = path_params.to_vec();
        for param in Self::convert_parameters(operation.get("parameters")) {
            // Operation-level parameters override path-level ones
            parameters.retain(|existing| {
                !(existing.name == param.name && existing.location == param.location)
            });
            parameters.push(param);
        }

        let request_body_schema = Self::extract_request_body(operation.get("requestBody"));

        debug!(
            "Extracted {} {} ({} parameters, body: {})",
            method,
            path,
            parameters.len(),
            request_body_schema.is_some()
        );

        OperationDefinition {
            path: path.to_string(),
            method,
            summary,
            operation_id,
            description: Self::non_empty_str(operation, "description"),
            tags: Self::extract_tags(operation.get("tags")),
            parameters,
            request_body_schema,
        }
    }

    /// Display summary precedence: summary, then operationId, then "<METHOD> <path>"
    fn display_summary(
        summary: Option<&str>,
        operation_id: Option<&str>,
        method: HttpMethod,
        path: &str,
    ) -> String {
        summary
            .or(operation_id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} {}", method.as_str(), path))
    }

    /// Tags as declared, or the `untagged` sentinel when there are none
    fn extract_tags(tags: Option<&Value>) -> Vec<String> {
        let tags: Vec<String> = tags
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        if tags.is_empty() {
            vec![crate::groups::UNTAGGED.to_string()]
        } else {
            tags
        }
    }

    fn convert_parameters(params: Option<&Value>) -> Vec<ParameterDescriptor> {
        params
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(Self::convert_parameter).collect())
            .unwrap_or_default()
    }

    /// Convert a raw parameter to a descriptor
    fn convert_parameter(param: &Value) -> Option<ParameterDescriptor> {
        let obj = param.as_object()?;

        // References are not resolved
        if obj.contains_key("$ref") {
            debug!("Skipping $ref parameter");
            return None;
        }

        let name = obj.get("name")?.as_str()?.to_string();
        let location_key = obj.get("in")?.as_str()?;
        let Some(location) = ParameterLocation::from_key(location_key) else {
            debug!("Dropping parameter {} in unsupported location {}", name, location_key);
            return None;
        };

        let required = obj.get("required").and_then(Value::as_bool).unwrap_or(false);

        Some(ParameterDescriptor {
            name,
            location,
            // A path template slot cannot be left out, whatever the document says
            required: required || location == ParameterLocation::Path,
            schema: obj.get("schema").map(Schema::from),
            description: Self::non_empty_str(obj, "description"),
        })
    }

    /// Schema of the `application/json` request body, if any
    fn extract_request_body(body: Option<&Value>) -> Option<Schema> {
        body?
            .get("content")?
            .get(JSON_MEDIA_TYPE)?
            .get("schema")
            .map(Schema::from)
    }

    fn non_empty_str(obj: &Map<String, Value>, key: &str) -> Option<String> {
        obj.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}
