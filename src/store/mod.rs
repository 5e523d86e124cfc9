//! Document store subsystem.
//!
//! # Data Flow
//! ```text
//! data file (JSON array)
//!     → DocumentStore (RwLock<Value>)
//!
//! Per CRUD operation:
//!     query template + route params
//!     → query.rs (placeholder substitution, JSONPath selection, node location)
//!     → document.rs (read clone / in-place mutation under one lock)
//!     → merge.rs (structural merge for partial updates)
//! ```
//!
//! # Design Decisions
//! - One lock per API dataset, held for a single store call only
//! - Reads return owned clones so serialization happens outside the lock
//! - No persistence: the dataset lives until the API is reloaded

pub mod document;
pub mod merge;
pub mod query;

use thiserror::Error;

pub use document::{DocumentStore, MutationOutcome};
pub use query::substitute_params;

/// Errors raised while evaluating or applying a query.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The query-path expression could not be parsed or evaluated.
    #[error("invalid query '{query}': {reason}")]
    InvalidQuery { query: String, reason: String },

    /// The dataset root is not a JSON array.
    #[error("dataset root must be a JSON array")]
    NotAnArray,

    /// Merge target is not an object.
    #[error("cannot merge an object into the {kind} at '{location}'")]
    NotMergeable { location: String, kind: &'static str },

    /// Replace target is not an object or array.
    #[error("node at '{0}' is not an object or array")]
    NotAContainer(String),

    /// The query selected the dataset root itself.
    #[error("the dataset root cannot be replaced or removed")]
    RootMutation,

    /// A selected node could not be found again in the dataset.
    #[error("selected node at '{0}' is not attached to the dataset")]
    Detached(String),
}

impl StoreError {
    /// Short machine-readable name, used in error response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::InvalidQuery { .. } => "invalid_query",
            StoreError::NotAnArray => "not_an_array",
            StoreError::NotMergeable { .. } => "not_mergeable",
            StoreError::NotAContainer(_) => "not_a_container",
            StoreError::RootMutation => "root_mutation",
            StoreError::Detached(_) => "detached_node",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::InvalidQuery {
            query: "$..[".into(),
            reason: "unexpected end".into(),
        };
        assert_eq!(err.to_string(), "invalid query '$..[': unexpected end");
        assert_eq!(err.kind(), "invalid_query");

        let err = StoreError::NotMergeable {
            location: "/0/name".into(),
            kind: "string",
        };
        assert!(err.to_string().contains("/0/name"));
    }
}
