//! Error types for the operation catalog

use thiserror::Error;

/// Result type alias for catalog operations
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Catalog error types
///
/// Structural problems inside a document never surface here: a missing or
/// malformed `paths` section simply yields an empty catalog.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid JSON in OpenAPI spec: {0}")]
    InvalidJson(#[from] serde_json::Error),
}
