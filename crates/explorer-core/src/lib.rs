//! # explorer-core
//!
//! Interactive request construction on top of `openapi-catalog`:
//! - Spec loading with a published, cancellable state machine
//! - Per-operation drafts with example body prefill
//! - Request building, validation and execution over a swappable transport

pub mod builder;
pub mod error;
pub mod executor;
pub mod loader;
pub mod selection;
pub mod session;
pub mod settings;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use builder::RequestBuilder;
pub use error::{ExplorerError, Result, ValidationError};
pub use executor::RequestExecutor;
pub use loader::{LoadState, SpecLoader};
pub use selection::{SelectionStore, SubmissionOutcome};
pub use session::{ExplorerSession, SubmissionState};
pub use settings::{Settings, DEFAULT_BASE_URL, DEFAULT_SPEC_URL};
pub use transport::{HttpTransport, ReqwestTransport, TransportError, TransportResponse};
pub use types::{ParameterValues, PreparedRequest, ResponseRecord};
