//! Bearer-token authorization.
//!
//! # Responsibilities
//! - Extract the bearer token from the `Authorization` header
//! - Validate issuer, audience, lifetime and signature as configured
//! - Check role claims, or scope claims when no roles are required
//!
//! # Design Decisions
//! - With signature validation off the token is only decoded; this is a
//!   mock-testing bypass and must never guard a real service
//! - Role and scope comparisons are case-insensitive
//! - The deny reason is for logs only; callers answer with a generic 401

use std::collections::HashSet;
use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, DecodingKey, Header, Validation};
use serde::Deserialize;

use crate::auth::keys::KeyStore;
use crate::auth::requirement::{AuthRequirement, TokenRequirement};
use crate::auth::AuthError;

/// Claims inspected after validation.
#[derive(Debug, Default, Deserialize)]
struct TokenClaims {
    #[serde(default)]
    roles: Option<ClaimValue>,
    #[serde(default)]
    role: Option<ClaimValue>,
    #[serde(default)]
    scp: Option<ClaimValue>,
    #[serde(default)]
    scope: Option<ClaimValue>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClaimValue {
    One(String),
    Many(Vec<String>),
}

impl ClaimValue {
    fn values(&self) -> Vec<&str> {
        match self {
            ClaimValue::One(value) => vec![value.as_str()],
            ClaimValue::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

impl TokenClaims {
    /// All role claims as one space-delimited string.
    fn roles(&self) -> String {
        [&self.roles, &self.role]
            .into_iter()
            .flatten()
            .flat_map(ClaimValue::values)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The scope claim, `scp` first.
    fn scopes(&self) -> String {
        self.scp
            .as_ref()
            .or(self.scope.as_ref())
            .map(|claim| claim.values().join(" "))
            .unwrap_or_default()
    }
}

/// Decides whether a request satisfies an authorization requirement.
#[derive(Debug, Clone)]
pub struct AuthorizationEvaluator {
    keys: Arc<KeyStore>,
}

impl AuthorizationEvaluator {
    /// Create an evaluator reading keys from `keys`.
    pub fn new(keys: Arc<KeyStore>) -> Self {
        Self { keys }
    }

    /// Shared key store, for the discovery task to publish into.
    pub fn key_store(&self) -> &Arc<KeyStore> {
        &self.keys
    }

    /// Admit or deny a request given its `Authorization` header value.
    pub fn authorize(&self, requirement: &AuthRequirement, authorization: Option<&str>) -> Result<(), AuthError> {
        let AuthRequirement::Token(requirement) = requirement else {
            return Ok(());
        };

        let token = bearer_token(authorization)?;
        let claims = self.validate(token, requirement)?;
        check_permissions(requirement, &claims)
    }

    fn validate(&self, token: &str, requirement: &TokenRequirement) -> Result<TokenClaims, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::Invalid(e.to_string()))?;

        if !requirement.validate_signing_key {
            let mut validation = validation_for(requirement, &header);
            validation.insecure_disable_signature_validation();
            return decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
                .map(|data| data.claims)
                .map_err(|e| AuthError::Invalid(e.to_string()));
        }

        let keys = self.keys.load().ok_or(AuthError::KeysUnavailable)?;
        let validation = validation_for(requirement, &header);

        let mut last_error = None;
        for candidate in keys.candidates(header.kid.as_deref()) {
            match decode::<TokenClaims>(token, &candidate.key, &validation) {
                Ok(data) => return Ok(data.claims),
                Err(e) if matches!(e.kind(), ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm) => {
                    last_error = Some(e);
                }
                Err(e) => return Err(AuthError::Invalid(e.to_string())),
            }
        }

        match last_error {
            Some(e) => Err(AuthError::Invalid(e.to_string())),
            None => Err(AuthError::NoMatchingKey(header.kid.unwrap_or_default())),
        }
    }
}

/// Extract `<token>` from `Bearer <token>`.
fn bearer_token(authorization: Option<&str>) -> Result<&str, AuthError> {
    let header = match authorization {
        Some(value) if !value.is_empty() => value,
        _ => return Err(AuthError::MissingToken),
    };

    let parts: Vec<&str> = header.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] => Ok(*token),
        _ => Err(AuthError::MalformedToken),
    }
}

fn validation_for(requirement: &TokenRequirement, header: &Header) -> Validation {
    let mut validation = Validation::new(header.alg);
    validation.required_spec_claims = HashSet::new();

    validation.validate_exp = requirement.validate_lifetime;
    validation.validate_nbf = requirement.validate_lifetime;
    if requirement.validate_lifetime {
        validation.required_spec_claims.insert("exp".to_string());
    }

    match &requirement.audience {
        Some(audience) => {
            validation.set_audience(&[audience]);
            validation.required_spec_claims.insert("aud".to_string());
        }
        None => validation.validate_aud = false,
    }

    if let Some(issuer) = &requirement.issuer {
        validation.set_issuer(&[issuer]);
        validation.required_spec_claims.insert("iss".to_string());
    }

    validation
}

fn check_permissions(requirement: &TokenRequirement, claims: &TokenClaims) -> Result<(), AuthError> {
    if !requirement.roles.is_empty() {
        let found = claims.roles();
        if requirement.roles.iter().any(|role| has_permission(role, &found)) {
            return Ok(());
        }
        return Err(AuthError::MissingRole {
            required: requirement.roles.join(", "),
            found,
        });
    }

    if !requirement.scopes.is_empty() {
        let found = claims.scopes();
        if requirement.scopes.iter().any(|scope| has_permission(scope, &found)) {
            return Ok(());
        }
        return Err(AuthError::MissingScope {
            required: requirement.scopes.join(", "),
            found,
        });
    }

    Ok(())
}

fn has_permission(permission: &str, granted: &str) -> bool {
    granted
        .split_whitespace()
        .any(|candidate| candidate.eq_ignore_ascii_case(permission))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(Some("Bearer abc")).unwrap(), "abc");
        assert!(matches!(bearer_token(None), Err(AuthError::MissingToken)));
        assert!(matches!(bearer_token(Some("")), Err(AuthError::MissingToken)));
        assert!(matches!(bearer_token(Some("abc")), Err(AuthError::MalformedToken)));
        assert!(matches!(bearer_token(Some("Basic abc")), Err(AuthError::MalformedToken)));
        assert!(matches!(bearer_token(Some("bearer abc")), Err(AuthError::MalformedToken)));
        assert!(matches!(bearer_token(Some("Bearer  abc")), Err(AuthError::MalformedToken)));
        assert!(matches!(bearer_token(Some("Bearer a b")), Err(AuthError::MalformedToken)));
    }

    #[test]
    fn test_has_permission() {
        assert!(has_permission("admin", "Reader Admin"));
        assert!(!has_permission("Owner", "Reader Admin"));
        assert!(!has_permission("Owner", ""));
    }

    #[test]
    fn test_claims_collection() {
        let claims: TokenClaims = serde_json::from_value(serde_json::json!({
            "roles": ["Admin", "Editor"],
            "role": "Reader",
            "scp": "Customers.Read Customers.Write"
        }))
        .unwrap();

        assert_eq!(claims.roles(), "Admin Editor Reader");
        assert_eq!(claims.scopes(), "Customers.Read Customers.Write");
    }

    #[test]
    fn test_scope_fallback() {
        let claims: TokenClaims = serde_json::from_value(serde_json::json!({
            "scope": "openid profile"
        }))
        .unwrap();

        assert_eq!(claims.roles(), "");
        assert_eq!(claims.scopes(), "openid profile");
    }

    #[test]
    fn test_none_requirement_allows_anything() {
        let evaluator = AuthorizationEvaluator::new(Arc::new(KeyStore::new()));
        assert!(evaluator.authorize(&AuthRequirement::None, None).is_ok());
        assert!(evaluator.authorize(&AuthRequirement::None, Some("garbage")).is_ok());
    }

    #[test]
    fn test_roles_take_precedence_over_scopes() {
        let requirement = TokenRequirement::default()
            .with_roles(["Admin"])
            .with_scopes(["Customers.Read"]);
        let claims: TokenClaims = serde_json::from_value(serde_json::json!({
            "scp": "Customers.Read"
        }))
        .unwrap();

        assert!(matches!(
            check_permissions(&requirement, &claims),
            Err(AuthError::MissingRole { .. })
        ));
    }
}
