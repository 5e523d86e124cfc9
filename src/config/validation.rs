//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, URLs and value ranges
//! - Check URL templates in API definitions are well formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function over the parsed value
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::uri::Authority;

use crate::config::definition::ApiDefinition;
use crate::config::schema::ServerConfig;

/// One semantic problem, tied to the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate the process configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a valid socket address", config.listener.bind_address),
        ));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::new("listener.max_body_bytes", "must be greater than 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    let observability = &config.observability;
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a valid socket address", observability.metrics_address),
        ));
    }

    if config.oidc.enabled {
        if let Err(e) = url::Url::parse(&config.oidc.discovery_url) {
            errors.push(ValidationError::new("oidc.discovery_url", e.to_string()));
        }
        if config.oidc.refresh_secs == 0 {
            errors.push(ValidationError::new("oidc.refresh_secs", "must be greater than 0"));
        }
        if config.oidc.timeout_secs == 0 {
            errors.push(ValidationError::new("oidc.timeout_secs", "must be greater than 0"));
        }
    }

    if let Some(address) = &config.upstream.address {
        if Authority::from_str(address).is_err() {
            errors.push(ValidationError::new(
                "upstream.address",
                format!("'{}' is not a valid host:port", address),
            ));
        }
    }

    for (i, api) in config.apis.iter().enumerate() {
        if api.api_file.as_os_str().is_empty() {
            errors.push(ValidationError::new(format!("apis[{}].api_file", i), "must not be empty"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate an API definition file.
pub fn validate_api_definition(definition: &ApiDefinition) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if definition.data_file.trim().is_empty() {
        errors.push(ValidationError::new("dataFile", "must not be empty"));
    }
    if !braces_balanced(&definition.base_url) {
        errors.push(ValidationError::new(
            "baseUrl",
            format!("unbalanced braces in '{}'", definition.base_url),
        ));
    }

    for (i, action) in definition.actions.iter().enumerate() {
        if !braces_balanced(&action.url) {
            errors.push(ValidationError::new(
                format!("actions[{}].url", i),
                format!("unbalanced braces in '{}'", action.url),
            ));
        }
        if action.method.as_deref().is_some_and(|m| m.trim().is_empty()) {
            errors.push(ValidationError::new(format!("actions[{}].method", i), "must not be empty"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Every `{` closes before the next one opens, and nothing is left open.
fn braces_balanced(template: &str) -> bool {
    let mut open = false;
    for c in template.chars() {
        match c {
            '{' if open => return false,
            '{' => open = true,
            '}' if !open => return false,
            '}' => open = false,
            _ => {}
        }
    }
    !open
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ApiConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ServerConfig::default();
        config.listener.bind_address = "not an address".to_string();
        config.timeouts.request_secs = 0;
        config.oidc.discovery_url = "::".to_string();
        config.upstream.address = Some("bad host:port:x".to_string());
        config.apis.push(ApiConfig::new(""));

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "timeouts.request_secs",
                "oidc.discovery_url",
                "upstream.address",
                "apis[0].api_file",
            ]
        );
    }

    #[test]
    fn test_disabled_oidc_is_not_checked() {
        let mut config = ServerConfig::default();
        config.oidc.enabled = false;
        config.oidc.discovery_url = String::new();

        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_api_definition() {
        let definition: ApiDefinition = serde_json::from_str(
            r#"{
                "baseUrl": "/api/{tenant",
                "dataFile": "",
                "actions": [
                    { "action": "getAll" },
                    { "action": "getOne", "url": "/{id}}" }
                ]
            }"#,
        )
        .unwrap();

        let errors = validate_api_definition(&definition).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["dataFile", "baseUrl", "actions[1].url"]);
    }

    #[test]
    fn test_braces() {
        assert!(braces_balanced("/{id}/orders/{order-id}"));
        assert!(braces_balanced(""));
        assert!(!braces_balanced("/{id"));
        assert!(!braces_balanced("/id}"));
        assert!(!braces_balanced("/{{id}}"));
    }
}
