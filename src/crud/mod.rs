//! CRUD execution subsystem.
//!
//! # Data Flow
//! ```text
//! MatchResult (route + params) + request body
//!     → executor.rs (dispatch on ActionKind)
//!     → DocumentStore (query / mutate)
//!     → response.rs (ResponseDescriptor + RequestLog)
//! ```
//!
//! # Outcomes
//! - Success: 200 / 201 / 204, logged as `mocked`
//! - Not found: 404 with a fixed body, logged as `mocked`
//! - Failure: 500 with the serialized error, logged as `failed`

pub mod action;
pub mod executor;
pub mod response;

pub use action::ActionKind;
pub use executor::{execute, ExecutionError};
pub use response::{Classification, RequestLog, ResponseDescriptor};
