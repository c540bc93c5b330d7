//! Example values generated from JSON Schema fragments

use crate::types::Schema;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

/// Produces a representative instance of a schema.
///
/// Resolution per node: `example`, then `default`, then the first `enum`
/// entry, then a placeholder chosen by `type`. Nesting beyond `max_depth`
/// yields `null`, so deeply nested or self-expanding schemas always
/// terminate.
#[derive(Debug, Clone, Copy)]
pub struct ExampleGenerator {
    max_depth: usize,
}

impl Default for ExampleGenerator {
    fn default() -> Self {
        Self { max_depth: 32 }
    }
}

impl ExampleGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit how many nested `properties`/`items` levels are expanded
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Generate an example; an absent schema yields `null`
    pub fn generate(&self, schema: Option<&Schema>) -> Value {
        self.generate_with_depth(schema, 0)
    }

    /// Example rendered as pretty JSON, for prefilling an editable body
    pub fn example_body(&self, schema: Option<&Schema>) -> String {
        let example = self.generate(schema);
        serde_json::to_string_pretty(&example).unwrap_or_else(|_| "{}".to_string())
    }

    fn generate_with_depth(&self, schema: Option<&Schema>, depth: usize) -> Value {
        let Some(schema) = schema else {
            return Value::Null;
        };
        if depth > self.max_depth {
            return Value::Null;
        }

        if let Some(example) = &schema.example {
            return example.clone();
        }
        if let Some(default) = &schema.default {
            return default.clone();
        }
        if let Some(first) = schema.enum_values.as_ref().and_then(|values| values.first()) {
            return first.clone();
        }

        match schema.schema_type.as_deref() {
            Some("string") if schema.format.as_deref() == Some("date-time") => {
                Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Some("string") => Value::String("string".to_string()),
            Some("integer") | Some("number") => Value::from(0),
            Some("boolean") => Value::Bool(false),
            Some("array") => Value::Array(vec![
                self.generate_with_depth(schema.items.as_deref(), depth + 1),
            ]),
            Some("object") => {
                let mut obj = Map::new();
                if let Some(properties) = &schema.properties {
                    for (name, prop) in properties {
                        obj.insert(name.clone(), self.generate_with_depth(Some(prop), depth + 1));
                    }
                }
                Value::Object(obj)
            }
            _ => Value::Null,
        }
    }
}

/// Generate an example with the default depth bound
pub fn generate_example(schema: Option<&Schema>) -> Value {
    ExampleGenerator::default().generate(schema)
}
