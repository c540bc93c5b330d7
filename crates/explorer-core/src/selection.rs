//! Selected operation and its per-operation draft

use openapi_catalog::{ExampleGenerator, HttpMethod, OperationDefinition};
use std::sync::Arc;
use tracing::debug;

use crate::error::ExplorerError;
use crate::types::{ParameterValues, ResponseRecord};

/// Result of one settled submission
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOutcome {
    pub response: Option<ResponseRecord>,
    pub error: Option<ExplorerError>,
}

/// Holds the currently selected operation plus everything the user entered
/// for it. Selecting another operation discards the whole draft.
#[derive(Debug, Default)]
pub struct SelectionStore {
    selected: Option<Arc<OperationDefinition>>,
    params: ParameterValues,
    body: String,
    last_response: Option<ResponseRecord>,
    last_error: Option<ExplorerError>,
    /// Bumped on every selection change
    generation: u64,
    examples: ExampleGenerator,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom example generator for body prefill
    pub fn with_example_generator(mut self, examples: ExampleGenerator) -> Self {
        self.examples = examples;
        self
    }

    /// Select an operation, resetting the draft and prefilling the body
    pub fn select(&mut self, operation: Arc<OperationDefinition>) {
        debug!("Selected {} {}", operation.method, operation.path);

        self.body = match &operation.request_body_schema {
            Some(schema) => self.examples.example_body(Some(schema)),
            None => String::new(),
        };
        self.params.clear();
        self.last_response = None;
        self.last_error = None;
        self.selected = Some(operation);
        self.generation += 1;
    }

    /// Drop the selection and its draft
    pub fn clear(&mut self) {
        self.selected = None;
        self.params.clear();
        self.body.clear();
        self.last_response = None;
        self.last_error = None;
        self.generation += 1;
    }

    pub fn selected(&self) -> Option<Arc<OperationDefinition>> {
        self.selected.clone()
    }

    /// Whether the given operation is the selected one
    pub fn is_selected(&self, method: HttpMethod, path: &str) -> bool {
        self.selected
            .as_ref()
            .is_some_and(|op| op.matches(method, path))
    }

    /// Current value of a parameter, empty when unset
    pub fn param(&self, name: &str) -> &str {
        self.params.get(name).map(String::as_str).unwrap_or_default()
    }

    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(name.into(), value.into());
    }

    pub fn params(&self) -> &ParameterValues {
        &self.params
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    pub fn last_response(&self) -> Option<&ResponseRecord> {
        self.last_response.as_ref()
    }

    pub fn last_error(&self) -> Option<&ExplorerError> {
        self.last_error.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Forget the previous outcome when a new submission starts
    pub fn begin_submission(&mut self) {
        self.last_response = None;
        self.last_error = None;
    }

    /// Apply a settled submission if the selection has not changed since it
    /// started. Returns whether it was applied.
    pub fn record_outcome(&mut self, generation: u64, outcome: SubmissionOutcome) -> bool {
        if generation != self.generation {
            debug!("Dropping outcome for a previous selection");
            return false;
        }
        self.last_response = outcome.response;
        self.last_error = outcome.error;
        true
    }
}
