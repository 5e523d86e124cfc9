//! Loading API definitions from disk and serving them.

mod common;

use std::fs;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use serde_json::json;
use tempfile::tempdir;

use crud_api_mock::config::{load_api, load_config, reload_api};
use crud_api_mock::lifecycle::startup::load_apis;
use crud_api_mock::MockRequest;

use common::*;

#[test]
fn definition_file_drives_the_engine() {
    let dir = tempdir().unwrap();
    let api_file = write_api(
        dir.path(),
        &json!({
            "baseUrl": "https://api.contoso.com/v1/customers",
            "dataFile": "customers.json",
            "actions": [
                { "action": "getAll" },
                { "action": "getOne", "url": "/{customer-id}", "query": "$[?(@.id == {customer_id})]" },
                { "action": "merge", "url": "/{customer-id}", "query": "$[?(@.id == {customer_id})]" }
            ]
        }),
        &customers(),
    );

    let engine = engine(vec![load_api(&api_file).unwrap()]);

    let response = engine
        .handle(&MockRequest::new("GET", "https://api.contoso.com/v1/customers/2"))
        .unwrap();
    assert_eq!(response.status, StatusCode::OK);

    let response = engine
        .handle(
            &MockRequest::new("PATCH", "https://api.contoso.com/v1/customers/2")
                .with_body(r#"{"tags": ["returning"], "email": null}"#),
        )
        .unwrap();
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let bob = &engine.apis()[0].store().snapshot()[1];
    assert_eq!(bob["tags"], json!(["returning"]));
    assert_eq!(bob["email"], "bob@contoso.com");
}

#[test]
fn entra_without_config_serves_anonymously() {
    let dir = tempdir().unwrap();
    let api_file = write_api(
        dir.path(),
        &json!({
            "baseUrl": "/api",
            "dataFile": "data.json",
            "auth": "Entra",
            "actions": [{ "action": "getAll" }]
        }),
        &customers(),
    );

    let engine = engine(vec![load_api(&api_file).unwrap()]);
    let response = engine.handle(&MockRequest::new("GET", "/api")).unwrap();
    assert_eq!(response.status, StatusCode::OK);
}

#[test]
fn entra_config_protects_the_api() {
    let dir = tempdir().unwrap();
    let api_file = write_api(
        dir.path(),
        &json!({
            "baseUrl": "/api",
            "dataFile": "data.json",
            "auth": "entra",
            "entraAuthConfig": {
                "audience": AUDIENCE,
                "issuer": ISSUER,
                "roles": ["Customers.Read"],
                "validateLifetime": true,
                "validateSigningKey": true
            },
            "actions": [{ "action": "getAll" }]
        }),
        &customers(),
    );

    let engine = engine(vec![load_api(&api_file).unwrap()]);

    let response = engine.handle(&MockRequest::new("GET", "/api")).unwrap();
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let token = mint(&claims_with(json!({"roles": ["customers.read"]})));
    let request = MockRequest::new("GET", "/api").with_header(AUTHORIZATION, bearer(&token));
    assert_eq!(engine.handle(&request).unwrap().status, StatusCode::OK);
}

#[test]
fn missing_data_file_disables_only_that_api() {
    let broken = tempdir().unwrap();
    let broken_api = broken.path().join("api.json");
    fs::write(
        &broken_api,
        json!({ "baseUrl": "/api", "dataFile": "absent.json", "actions": [{ "action": "getAll" }] }).to_string(),
    )
    .unwrap();

    let working = tempdir().unwrap();
    let working_api = write_api(
        working.path(),
        &json!({ "baseUrl": "/api", "dataFile": "data.json", "actions": [{ "action": "getAll" }] }),
        &json!([{"id": 1}]),
    );

    let engine = engine(load_apis(&[
        crud_api_mock::config::ApiConfig::new(&broken_api),
        crud_api_mock::config::ApiConfig::new(&working_api),
    ]));

    let response = engine.handle(&MockRequest::new("GET", "/api")).unwrap();
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, serde_json::to_string_pretty(&json!([{"id": 1}])).unwrap());
}

#[test]
fn corrupt_data_on_reload_keeps_the_previous_api() {
    let dir = tempdir().unwrap();
    let api_file = write_api(
        dir.path(),
        &json!({ "baseUrl": "/api", "dataFile": "data.json", "actions": [{ "action": "getAll" }] }),
        &customers(),
    );
    let engine = engine(vec![load_api(&api_file).unwrap()]);

    fs::write(dir.path().join("data.json"), "[{\"id\": 1,").unwrap();
    assert!(reload_api(&api_file).is_err());

    let response = engine.handle(&MockRequest::new("GET", "/api")).unwrap();
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<serde_json::Value>(&response.body).unwrap(), customers());

    fs::write(dir.path().join("data.json"), "[]").unwrap();
    assert!(engine.replace_api(0, reload_api(&api_file).unwrap()));
    let response = engine.handle(&MockRequest::new("GET", "/api")).unwrap();
    assert_eq!(response.body, "[]");
}

#[test]
fn server_config_points_at_api_files() {
    let dir = tempdir().unwrap();
    let config_file = dir.path().join("mock.toml");
    fs::write(
        &config_file,
        r#"
[listener]
bind_address = "127.0.0.1:8123"

[observability]
log_format = "json"

[oidc]
enabled = false

[upstream]
address = "127.0.0.1:3000"

[[apis]]
api_file = "api.json"
"#,
    )
    .unwrap();

    let config = load_config(&config_file).unwrap();
    assert_eq!(config.listener.bind_address, "127.0.0.1:8123");
    assert!(!config.oidc.enabled);
    assert_eq!(config.upstream.address.as_deref(), Some("127.0.0.1:3000"));
    assert_eq!(config.apis[0].api_file, dir.path().join("api.json"));
    assert!(config.apis[0].watch);
}
