//! Authorization subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     discovery.rs fetches OIDC metadata + JWK set (background task)
//!     → keys.rs publishes SigningKeys snapshot into KeyStore
//!
//! Per request (twice: API-level, then route-level):
//!     AuthRequirement + Authorization header
//!     → evaluator.rs (bearer extraction, JWT validation, role/scope check)
//!     → Ok(()) or AuthError (reason for logs)
//! ```
//!
//! # Design Decisions
//! - Key material is read-only per request and swapped wholesale
//! - Requests never wait for discovery; missing keys deny signature checks
//! - API-level and route-level requirements are independent decisions

pub mod discovery;
pub mod evaluator;
pub mod keys;
pub mod requirement;

use thiserror::Error;

pub use evaluator::AuthorizationEvaluator;
pub use keys::{KeyStore, SigningKey, SigningKeys};
pub use requirement::{AuthRequirement, TokenRequirement};

/// Why a request was denied.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No token found on the request.")]
    MissingToken,

    #[error("The specified token is not a valid Bearer token.")]
    MalformedToken,

    #[error("The specified token is not valid: signing keys unavailable")]
    KeysUnavailable,

    #[error("The specified token is not valid: no signing key matches kid '{0}'")]
    NoMatchingKey(String),

    #[error("The specified token is not valid: {0}")]
    Invalid(String),

    #[error("The specified token does not have the necessary role(s). Required one of: {required}, found: {found}")]
    MissingRole { required: String, found: String },

    #[error("The specified token does not have the necessary scope(s). Required one of: {required}, found: {found}")]
    MissingScope { required: String, found: String },
}
