//! Normalized OpenAPI document

use crate::error::ParseResult;
use crate::operations::OperationExtractor;
use crate::types::*;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Operations of one path, keyed by method
pub type PathOperations = IndexMap<HttpMethod, OperationDefinition>;

/// A loaded OpenAPI document reduced to its operations.
///
/// Paths and methods keep document order, which is the discovery order used
/// to break ties when grouping. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Specification {
    /// API title from `info.title`
    pub title: Option<String>,
    /// API version from `info.version`
    pub version: Option<String>,
    paths: IndexMap<String, PathOperations>,
}

impl Specification {
    /// Parse a JSON document. Only invalid JSON is an error; a document
    /// without a usable `paths` object yields an empty specification.
    pub fn from_json_str(content: &str) -> ParseResult<Self> {
        let doc: Value = serde_json::from_str(content)?;
        Ok(Self::from_value(&doc))
    }

    /// Normalize an already parsed document
    pub fn from_value(doc: &Value) -> Self {
        let info = doc.get("info");
        let title = info
            .and_then(|i| i.get("title"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let version = info
            .and_then(|i| i.get("version"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let mut paths = IndexMap::new();

        match doc.get("paths").and_then(Value::as_object) {
            Some(raw_paths) => {
                for (path, path_item) in raw_paths {
                    let mut methods = PathOperations::new();
                    for op in OperationExtractor::extract_path_item(path, path_item) {
                        if methods.contains_key(&op.method) {
                            warn!("Duplicate {} operation under {}, keeping the first", op.method, path);
                            continue;
                        }
                        methods.insert(op.method, op);
                    }
                    if !methods.is_empty() {
                        paths.insert(path.clone(), methods);
                    }
                }
            }
            None => debug!("Document has no paths object, catalog is empty"),
        }

        let spec = Self {
            title,
            version,
            paths,
        };
        debug!("Normalized spec with {} operations", spec.len());
        spec
    }

    /// Path → method → operation, in document order
    pub fn paths(&self) -> &IndexMap<String, PathOperations> {
        &self.paths
    }

    /// All operations in discovery order
    pub fn operations(&self) -> impl Iterator<Item = &OperationDefinition> {
        self.paths.values().flat_map(|methods| methods.values())
    }

    /// Look up an operation by identity
    pub fn operation(&self, method: HttpMethod, path: &str) -> Option<&OperationDefinition> {
        self.paths.get(path)?.get(&method)
    }

    /// Number of operations
    pub fn len(&self) -> usize {
        self.paths.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
