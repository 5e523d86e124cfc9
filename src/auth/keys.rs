//! Signing-key snapshots shared by every token validation.
//!
//! # Responsibilities
//! - Hold the decoding keys published by OIDC discovery
//! - Select candidate keys for a token's `kid`
//! - Swap in a fresh key set without blocking readers
//!
//! # Design Decisions
//! - Snapshot starts empty; validation that needs keys denies until populated
//! - Replace-on-write via `ArcSwapOption`, readers never lock

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::DecodingKey;

/// One key usable for signature verification.
#[derive(Clone)]
pub struct SigningKey {
    pub kid: Option<String>,
    pub key: DecodingKey,
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey").field("kid", &self.kid).finish_non_exhaustive()
    }
}

/// An immutable set of signing keys plus the issuer that published them.
#[derive(Debug, Clone, Default)]
pub struct SigningKeys {
    issuer: Option<String>,
    keys: Vec<SigningKey>,
}

impl SigningKeys {
    /// Build a key set from already-decoded keys.
    pub fn new(issuer: Option<String>, keys: Vec<SigningKey>) -> Self {
        Self { issuer, keys }
    }

    /// Convert a JWK set, skipping keys the validator cannot use.
    pub fn from_jwks(issuer: Option<String>, jwks: &JwkSet) -> Self {
        let keys = jwks
            .keys
            .iter()
            .filter_map(|jwk| match DecodingKey::from_jwk(jwk) {
                Ok(key) => Some(SigningKey {
                    kid: jwk.common.key_id.clone(),
                    key,
                }),
                Err(e) => {
                    tracing::warn!(kid = ?jwk.common.key_id, error = %e, "Skipping unusable signing key");
                    None
                }
            })
            .collect();

        Self { issuer, keys }
    }

    /// Issuer advertised alongside the keys.
    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    /// Number of usable keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the set holds no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys to try for a token: those with a matching `kid`, or all keys when the token has none.
    pub fn candidates<'a>(&'a self, kid: Option<&'a str>) -> impl Iterator<Item = &'a SigningKey> + 'a {
        self.keys
            .iter()
            .filter(move |key| kid.is_none() || key.kid.as_deref() == kid)
    }
}

/// Process-wide holder of the current signing keys.
#[derive(Debug, Default)]
pub struct KeyStore {
    current: ArcSwapOption<SigningKeys>,
}

impl KeyStore {
    /// A store with no keys yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `keys`.
    pub fn with_keys(keys: SigningKeys) -> Self {
        Self {
            current: ArcSwapOption::from_pointee(keys),
        }
    }

    /// Current snapshot, if discovery has completed.
    pub fn load(&self) -> Option<Arc<SigningKeys>> {
        self.current.load_full()
    }

    /// Replace the snapshot wholesale.
    pub fn publish(&self, keys: SigningKeys) {
        tracing::info!(keys = keys.len(), issuer = ?keys.issuer(), "Signing keys updated");
        self.current.store(Some(Arc::new(keys)));
    }
}
