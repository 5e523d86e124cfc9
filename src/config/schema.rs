//! Configuration schema definitions.
//!
//! This module defines the process configuration of the mock server.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the mock server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Token signing-key discovery.
    pub oidc: OidcConfig,

    /// Where unmatched origin-form requests go.
    pub upstream: UpstreamConfig,

    /// Mock API definitions, consulted in order.
    pub apis: Vec<ApiConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8000").
    pub bind_address: String,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// OpenID Connect discovery for token signing keys.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OidcConfig {
    /// Fetch signing keys at startup and periodically.
    pub enabled: bool,

    /// OpenID configuration document URL.
    pub discovery_url: String,

    /// HTTP timeout for discovery requests in seconds.
    pub timeout_secs: u64,

    /// Refresh interval in seconds.
    pub refresh_secs: u64,
}

impl Default for OidcConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            discovery_url:
                "https://login.microsoftonline.com/organizations/v2.0/.well-known/openid-configuration"
                    .to_string(),
            timeout_secs: 10,
            refresh_secs: 24 * 60 * 60,
        }
    }
}

/// Pass-through target for origin-form requests.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream address (e.g., "127.0.0.1:3000"). Unset answers 404.
    pub address: Option<String>,
}

/// One mock API entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Path to the API definition file (JSON).
    pub api_file: PathBuf,

    /// Reload the API when its definition or data file changes.
    #[serde(default = "default_watch")]
    pub watch: bool,
}

impl ApiConfig {
    pub fn new(api_file: impl Into<PathBuf>) -> Self {
        Self {
            api_file: api_file.into(),
            watch: default_watch(),
        }
    }
}

fn default_watch() -> bool {
    true
}
