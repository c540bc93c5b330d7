//! Error types for explorer-core

use thiserror::Error;

/// Result type alias for explorer operations
pub type Result<T> = std::result::Result<T, ExplorerError>;

/// Input problems detected before a request is sent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing path param: {0}")]
    MissingRequiredParameter(String),

    #[error("Body is not valid JSON: {0}")]
    InvalidBodyJson(String),
}

/// Explorer error types
///
/// Every variant carries owned text so errors can be cloned into published
/// loader and session state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExplorerError {
    #[error("Failed to load spec: {status} {status_text}")]
    SpecFetch { status: u16, status_text: String },

    #[error("Invalid JSON in OpenAPI spec: {0}")]
    SpecParse(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("Request failed with status {0}")]
    UnsuccessfulStatus(u16),

    #[error("Operation not found: {0}")]
    OperationNotFound(String),

    #[error("Spec is not loaded")]
    SpecNotLoaded,

    #[error("No operation is selected")]
    NothingSelected,

    #[error("A request is already in flight")]
    SubmissionInFlight,

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl ExplorerError {
    /// Whether the error was raised before anything was sent
    pub fn is_validation(&self) -> bool {
        matches!(self, ExplorerError::Validation(_))
    }
}

impl From<std::io::Error> for ExplorerError {
    fn from(err: std::io::Error) -> Self {
        ExplorerError::Io(err.to_string())
    }
}

impl From<openapi_catalog::ParseError> for ExplorerError {
    fn from(err: openapi_catalog::ParseError) -> Self {
        match err {
            openapi_catalog::ParseError::InvalidJson(e) => ExplorerError::SpecParse(e.to_string()),
        }
    }
}
