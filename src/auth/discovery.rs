//! OIDC discovery: fetch and periodically refresh signing keys.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::jwk::JwkSet;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::auth::keys::{KeyStore, SigningKeys};
use crate::config::OidcConfig;

/// Errors raised while fetching signing keys.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// HTTP request failed or returned a non-success status.
    #[error("discovery request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The key set held no key the validator can use.
    #[error("no usable signing keys at {0}")]
    NoUsableKeys(String),
}

#[derive(Debug, Deserialize)]
struct DiscoveryDocument {
    #[serde(default)]
    issuer: Option<String>,
    jwks_uri: String,
}

/// Fetch the discovery document at `discovery_url` and the key set it points to.
pub async fn fetch_signing_keys(client: &reqwest::Client, discovery_url: &str) -> Result<SigningKeys, DiscoveryError> {
    let document: DiscoveryDocument = client
        .get(discovery_url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let jwks: JwkSet = client
        .get(&document.jwks_uri)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let keys = SigningKeys::from_jwks(document.issuer, &jwks);
    if keys.is_empty() {
        return Err(DiscoveryError::NoUsableKeys(document.jwks_uri));
    }
    Ok(keys)
}

/// Spawn a task that populates `store` now and then every `refresh_secs`.
///
/// A failed refresh keeps the previous keys.
pub fn spawn_key_refresh(
    store: Arc<KeyStore>,
    config: OidcConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                tracing::error!(error = %e, "Failed to build discovery client; token signatures cannot be validated");
                return;
            }
        };

        let mut interval = tokio::time::interval(Duration::from_secs(config.refresh_secs.max(1)));
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match fetch_signing_keys(&client, &config.discovery_url).await {
                        Ok(keys) => store.publish(keys),
                        Err(e) => tracing::error!(
                            url = %config.discovery_url,
                            error = %e,
                            "An error has occurred while loading signing keys"
                        ),
                    }
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Signing key refresh stopped");
                    break;
                }
            }
        }
    })
}
