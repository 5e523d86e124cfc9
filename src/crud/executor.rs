//! CRUD operation dispatch.
//!
//! # Responsibilities
//! - Run the matched route's operation against the dataset
//! - Map each outcome to a status, body and log classification
//!
//! # Design Decisions
//! - One exhaustive match over `ActionKind`, no handler tables
//! - Request bodies are parsed before the store lock is taken
//! - Single-node operations report not-found before a bad body
//! - Every failure becomes a 500 carrying the error; nothing propagates

use std::collections::HashMap;

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::crud::action::ActionKind;
use crate::crud::response::{status_line, RequestLog, ResponseDescriptor};
use crate::routing::RouteDefinition;
use crate::store::{substitute_params, DocumentStore, MutationOutcome, StoreError};

/// Errors raised while executing an operation.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The request body is not a JSON object.
    #[error("request body is not a valid JSON object: {0}")]
    Body(#[source] serde_json::Error),

    /// The dataset rejected the operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The result could not be serialized.
    #[error("failed to serialize response: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl ExecutionError {
    /// Short machine-readable name, used in error response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ExecutionError::Body(_) => "invalid_body",
            ExecutionError::Store(e) => e.kind(),
            ExecutionError::Serialize(_) => "serialization",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    message: String,
    kind: &'a str,
}

enum Outcome {
    Json(StatusCode, String),
    Empty(StatusCode),
    NotFound,
}

/// Execute `route` against `store`.
///
/// `params` are the values captured from the request URL; `body` is the raw
/// request body.
pub fn execute(
    store: &DocumentStore,
    route: &RouteDefinition,
    params: &HashMap<String, String>,
    body: &str,
) -> ResponseDescriptor {
    let query = substitute_params(&route.query, params);

    let outcome = match route.action {
        ActionKind::GetAll => get_all(store),
        ActionKind::GetOne => get_one(store, &query),
        ActionKind::GetMany => get_many(store, &query),
        ActionKind::Create => create(store, body),
        ActionKind::Merge => merge(store, &query, body),
        ActionKind::Update => update(store, &query, body),
        ActionKind::Delete => delete(store, &query),
    };

    match outcome {
        Ok(Outcome::Json(status, body)) => {
            ResponseDescriptor::json(status, body, RequestLog::mocked(vec![status_line(status, &route.url)]))
        }
        Ok(Outcome::Empty(status)) => {
            ResponseDescriptor::empty(status, RequestLog::mocked(vec![status_line(status, &route.url)]))
        }
        Ok(Outcome::NotFound) => ResponseDescriptor::not_found(&route.url),
        Err(e) => failure(route, &query, e),
    }
}

fn failure(route: &RouteDefinition, query: &str, error: ExecutionError) -> ResponseDescriptor {
    let status = StatusCode::INTERNAL_SERVER_ERROR;
    let body = ErrorBody {
        error: ErrorDetail {
            message: error.to_string(),
            kind: error.kind(),
        },
    };
    let body = serde_json::to_string_pretty(&body)
        .unwrap_or_else(|_| r#"{"error":{"message":"Internal error"}}"#.to_string());

    tracing::debug!(action = %route.action, query = %query, error = %error, "Mock operation failed");

    ResponseDescriptor::json(
        status,
        body,
        RequestLog::failed(vec![status_line(status, &route.url), error.to_string()]),
    )
}

fn get_all(store: &DocumentStore) -> Result<Outcome, ExecutionError> {
    let data = store.snapshot();
    Ok(Outcome::Json(StatusCode::OK, to_json(&data)?))
}

fn get_one(store: &DocumentStore, query: &str) -> Result<Outcome, ExecutionError> {
    match store.query_one(query)? {
        Some(node) => Ok(Outcome::Json(StatusCode::OK, to_json(&node)?)),
        None => Ok(Outcome::NotFound),
    }
}

fn get_many(store: &DocumentStore, query: &str) -> Result<Outcome, ExecutionError> {
    let nodes = Value::Array(store.query_many(query)?);
    Ok(Outcome::Json(StatusCode::OK, to_json(&nodes)?))
}

fn create(store: &DocumentStore, body: &str) -> Result<Outcome, ExecutionError> {
    let node = parse_object(body)?;
    let echo = to_json(&node)?;
    store.append(Value::Object(node))?;
    Ok(Outcome::Json(StatusCode::CREATED, echo))
}

fn merge(store: &DocumentStore, query: &str, body: &str) -> Result<Outcome, ExecutionError> {
    let partial = match parse_object(body) {
        Ok(partial) => partial,
        Err(e) => return not_found_or(store, query, e),
    };

    match store.merge_into(query, &partial)? {
        MutationOutcome::Applied => Ok(Outcome::Empty(StatusCode::NO_CONTENT)),
        MutationOutcome::NotFound => Ok(Outcome::NotFound),
    }
}

fn update(store: &DocumentStore, query: &str, body: &str) -> Result<Outcome, ExecutionError> {
    let replacement = match parse_object(body) {
        Ok(replacement) => replacement,
        Err(e) => return not_found_or(store, query, e),
    };

    match store.replace_at(query, Value::Object(replacement))? {
        MutationOutcome::Applied => Ok(Outcome::Empty(StatusCode::NO_CONTENT)),
        MutationOutcome::NotFound => Ok(Outcome::NotFound),
    }
}

fn delete(store: &DocumentStore, query: &str) -> Result<Outcome, ExecutionError> {
    match store.remove_at(query)? {
        MutationOutcome::Applied => Ok(Outcome::Empty(StatusCode::NO_CONTENT)),
        MutationOutcome::NotFound => Ok(Outcome::NotFound),
    }
}

/// A missing target wins over a malformed body.
fn not_found_or(store: &DocumentStore, query: &str, error: ExecutionError) -> Result<Outcome, ExecutionError> {
    match store.query_one(query)? {
        Some(_) => Err(error),
        None => Ok(Outcome::NotFound),
    }
}

fn parse_object(body: &str) -> Result<Map<String, Value>, ExecutionError> {
    serde_json::from_str(body).map_err(ExecutionError::Body)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ExecutionError> {
    serde_json::to_string_pretty(value).map_err(ExecutionError::Serialize)
}
