//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, URL)
//!     → router.rs (ordered route lookup)
//!     → matcher.rs (exact or templated URL match)
//!     → Return: MatchResult { route, params } or no match
//!
//! Route Compilation (at load):
//!     RouteDefinition[]
//!     → Join with API base URL
//!     → Compile placeholder templates to anchored regexes
//!     → Freeze as immutable RouteMatcher
//! ```
//!
//! # Design Decisions
//! - Routes compiled at load, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (declaration order)
//! - No match is pass-through, not an error

pub mod matcher;
pub mod route;
pub mod router;

pub use matcher::{absolute_template, TemplateMatcher};
pub use route::RouteDefinition;
pub use router::{MatchResult, RouteMatcher};
