//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, capture into MockRequest)
//!     → [pipeline engine decides]
//!         handled     → response.rs (ResponseDescriptor → HTTP)
//!         unclaimed   → forward.rs (absolute target / upstream / 404)
//!     → Send to client
//! ```

pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use forward::Forwarder;
pub use request::{RequestIdGenerator, X_REQUEST_ID};
pub use server::HttpServer;
