//! # openapi-catalog
//!
//! OpenAPI 3.x operation catalog for API Explorer.
//! Normalizes loaded documents into operations, groups them by tag for
//! browsing and generates example values from JSON Schema fragments.

mod types;
mod parser;
mod operations;
mod groups;
mod example;
mod error;

pub use types::*;
pub use parser::Specification;
pub use operations::OperationExtractor;
pub use groups::{OperationGroups, UNTAGGED};
pub use example::{generate_example, ExampleGenerator};
pub use error::{ParseError, ParseResult};
