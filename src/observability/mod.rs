//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! pipeline (one event per handled request)
//!     → logging.rs (request log: lines, classification, request id)
//!     → metrics.rs (request / auth / pass-through / reload counters)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID (`x-request-id`) correlates every log line of a request
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
