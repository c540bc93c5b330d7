//! Type definitions for normalized OpenAPI operations

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP methods recognized as operations under a path item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Head,
}

impl HttpMethod {
    /// All recognized verbs
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Classify a path item key. Matching is case-insensitive; anything that
    /// is not one of the seven verbs (e.g. `parameters`, `summary`, `trace`)
    /// yields `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(key))
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Parameter location in HTTP request
///
/// Cookie parameters are not supported and never make it into a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
}

impl ParameterLocation {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "path" => Some(ParameterLocation::Path),
            "query" => Some(ParameterLocation::Query),
            "header" => Some(ParameterLocation::Header),
            _ => None,
        }
    }
}

/// A JSON Schema fragment, consumed as-is (no `$ref` resolution).
///
/// Deserialization is lenient: keywords with an unexpected shape are treated
/// as absent instead of failing the whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<Schema>>,
}

impl Schema {
    /// Schema with only a `type` keyword
    pub fn of_type(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            ..Self::default()
        }
    }
}

impl From<Value> for Schema {
    fn from(value: Value) -> Self {
        Schema::from(&value)
    }
}

impl From<&Value> for Schema {
    fn from(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Schema::default();
        };

        // OpenAPI 3.1 allows `type: ["string", "null"]`; take the first non-null entry
        let schema_type = match obj.get("type") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Array(types)) => types
                .iter()
                .filter_map(Value::as_str)
                .find(|t| *t != "null")
                .map(str::to_string),
            _ => None,
        };

        let properties = obj.get("properties").and_then(Value::as_object).map(|props| {
            props
                .iter()
                .map(|(name, prop)| (name.clone(), Schema::from(prop)))
                .collect()
        });

        let any_of = obj
            .get("anyOf")
            .and_then(Value::as_array)
            .map(|variants| variants.iter().map(Schema::from).collect());

        Schema {
            schema_type,
            enum_values: obj.get("enum").and_then(Value::as_array).cloned(),
            // An explicit `null` is a value, distinct from an absent keyword
            default: obj.get("default").cloned(),
            example: obj.get("example").cloned(),
            properties,
            items: obj
                .get("items")
                .filter(|v| v.is_object())
                .map(|items| Box::new(Schema::from(items))),
            format: obj.get("format").and_then(Value::as_str).map(str::to_string),
            any_of,
        }
    }
}

/// A parameter for an API operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Parameter name
    pub name: String,
    /// Where the parameter is located
    pub location: ParameterLocation,
    /// Whether the parameter is declared required
    pub required: bool,
    /// JSON Schema for the parameter
    pub schema: Option<Schema>,
    /// Parameter description (used as input placeholder)
    pub description: Option<String>,
}

impl ParameterDescriptor {
    /// Short type label for display next to the parameter name
    pub fn type_hint(&self) -> Option<&str> {
        let schema = self.schema.as_ref()?;
        Some(match (&schema.schema_type, &schema.any_of) {
            (Some(t), _) => t.as_str(),
            (None, Some(_)) => "anyOf",
            (None, None) => "value",
        })
    }
}

/// A single operation extracted from the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDefinition {
    /// URL path template (e.g. "/users/{id}")
    pub path: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Display summary: `summary`, else `operationId`, else "<METHOD> <path>"
    pub summary: String,
    /// operationId from the document
    pub operation_id: Option<String>,
    /// Full description
    pub description: Option<String>,
    /// Tags for grouping, never empty
    pub tags: Vec<String>,
    /// Path, query and header parameters
    pub parameters: Vec<ParameterDescriptor>,
    /// Schema of the `application/json` request body
    pub request_body_schema: Option<Schema>,
}

impl OperationDefinition {
    /// Parameters declared at the given location, in declaration order
    pub fn parameters_in(
        &self,
        location: ParameterLocation,
    ) -> impl Iterator<Item = &ParameterDescriptor> {
        self.parameters.iter().filter(move |p| p.location == location)
    }

    /// Whether the operation takes a JSON body
    pub fn has_json_body(&self) -> bool {
        self.request_body_schema.is_some()
    }

    /// Identity of the operation within a specification
    pub fn matches(&self, method: HttpMethod, path: &str) -> bool {
        self.method == method && self.path == path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_from_key_is_case_insensitive() {
        assert_eq!(HttpMethod::from_key("get"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::from_key("DELETE"), Some(HttpMethod::Delete));
        assert_eq!(HttpMethod::from_key("Options"), Some(HttpMethod::Options));
        assert_eq!(HttpMethod::from_key("parameters"), None);
        assert_eq!(HttpMethod::from_key("trace"), None);
    }

    #[test]
    fn test_schema_from_value_keeps_property_order() {
        let schema: Schema = serde_json::from_value(json!({
            "type": "object",
            "properties": {
                "zeta": {"type": "string"},
                "alpha": {"type": "integer"}
            }
        }))
        .unwrap();

        let names: Vec<&str> = schema
            .properties
            .as_ref()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(names, ["zeta", "alpha"]);
    }

    #[test]
    fn test_schema_lenient_keywords() {
        let schema = Schema::from(json!({
            "type": ["null", "integer"],
            "enum": "not-a-list",
            "items": true,
            "example": null
        }));

        assert_eq!(schema.schema_type.as_deref(), Some("integer"));
        assert!(schema.enum_values.is_none());
        assert!(schema.items.is_none());
        assert_eq!(schema.example, Some(Value::Null));
        assert!(schema.default.is_none());
    }

    #[test]
    fn test_type_hint() {
        let mut param = ParameterDescriptor {
            name: "q".to_string(),
            location: ParameterLocation::Query,
            required: false,
            schema: None,
            description: None,
        };
        assert_eq!(param.type_hint(), None);

        param.schema = Some(Schema::from(json!({"anyOf": [{"type": "string"}]})));
        assert_eq!(param.type_hint(), Some("anyOf"));

        param.schema = Some(Schema::default());
        assert_eq!(param.type_hint(), Some("value"));

        param.schema = Some(Schema::of_type("boolean"));
        assert_eq!(param.type_hint(), Some("boolean"));
    }
}
