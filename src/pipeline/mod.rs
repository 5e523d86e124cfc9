//! Request pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! MockRequest (method, url, headers, body, request id)
//!     → engine.rs: for each MockApi owning the url
//!         → API-level auth (deny → 401)
//!         → RouteMatcher (no match → next API)
//!         → route-level auth (deny → 401)
//!         → crud::execute
//!     → CORS, request log, metrics
//!     → ResponseDescriptor, or None for pass-through
//! ```

pub mod api;
pub mod engine;

pub use api::MockApi;
pub use engine::{MockEngine, MockRequest};
