//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!
//! per [[apis]] entry:
//!     api definition (JSON) + data file (JSON array)
//!     → definition.rs (routes, auth requirements)
//!     → MockApi
//!
//! On change:
//!     watcher.rs detects change
//!     → loader.rs loads the API again
//!     → atomic swap of that API in the engine
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Misconfigured auth or data disables a feature, never the process

pub mod definition;
pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use definition::{ActionDefinition, ApiDefinition, AuthKind, EntraAuthConfig};
pub use loader::{load_api, load_config, reload_api, ConfigError};
pub use schema::{
    ApiConfig, ListenerConfig, LogFormat, ObservabilityConfig, OidcConfig, ServerConfig,
    TimeoutConfig, UpstreamConfig,
};
pub use watcher::{ApiReload, ApiWatcher};
