//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::HeaderValue;
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use serde_json::{json, Value};

use crud_api_mock::auth::{AuthorizationEvaluator, KeyStore, SigningKey, SigningKeys};
use crud_api_mock::{MockApi, MockEngine};

pub const ISSUER: &str = "https://login.contoso.test/tenant/v2.0";
pub const AUDIENCE: &str = "api://customers";
pub const KID: &str = "test-key";
pub const SECRET: &[u8] = b"integration-test-secret";

pub fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Standard claims valid for an hour.
pub fn claims() -> Value {
    json!({
        "iss": ISSUER,
        "aud": AUDIENCE,
        "exp": now() + 3600,
        "nbf": now() - 60,
    })
}

/// `claims()` plus `extra`.
pub fn claims_with(extra: Value) -> Value {
    let mut claims = claims();
    if let (Some(target), Some(extra)) = (claims.as_object_mut(), extra.as_object()) {
        for (key, value) in extra {
            target.insert(key.clone(), value.clone());
        }
    }
    claims
}

pub fn mint(claims: &Value) -> String {
    mint_with_secret(claims, SECRET)
}

pub fn mint_with_secret(claims: &Value, secret: &[u8]) -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(KID.to_string());
    encode(&header, claims, &EncodingKey::from_secret(secret)).unwrap()
}

pub fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

/// A key store holding the test HMAC key, as discovery would publish it.
pub fn key_store() -> Arc<KeyStore> {
    Arc::new(KeyStore::with_keys(SigningKeys::new(
        Some(ISSUER.to_string()),
        vec![SigningKey {
            kid: Some(KID.to_string()),
            key: DecodingKey::from_secret(SECRET),
        }],
    )))
}

pub fn engine(apis: Vec<MockApi>) -> MockEngine {
    MockEngine::new(apis, AuthorizationEvaluator::new(key_store()))
}

pub fn customers() -> Value {
    json!([
        {"id": 1, "name": "Alice", "email": "alice@contoso.com", "tags": ["vip"]},
        {"id": 2, "name": "Bob", "email": "bob@contoso.com", "tags": []},
        {"id": 3, "name": "Carol", "email": "carol@contoso.com", "tags": ["new"]}
    ])
}

/// Write an API definition and its data file into `dir`; returns the definition path.
pub fn write_api(dir: &Path, definition: &Value, data: &Value) -> PathBuf {
    let data_file = definition["dataFile"].as_str().unwrap_or("data.json");
    fs::write(dir.join(data_file), serde_json::to_string_pretty(data).unwrap()).unwrap();

    let api_file = dir.join("api.json");
    fs::write(&api_file, serde_json::to_string_pretty(definition).unwrap()).unwrap();
    api_file
}
