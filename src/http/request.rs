//! Request capture.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) when the client sent none
//! - Turn a buffered axum request into the engine's `MockRequest`
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The request-target is kept exactly as received
//! - Bodies are decoded lossily; the executor rejects anything that is not JSON

use axum::http::request::Parts;
use axum::http::{HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::pipeline::MockRequest;

/// Correlation header.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdGenerator;

impl MakeRequestId for RequestIdGenerator {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Build the engine's view of a request.
pub fn capture(parts: &Parts, body: &[u8]) -> MockRequest {
    MockRequest {
        method: parts.method.as_str().to_string(),
        url: parts.uri.to_string(),
        headers: parts.headers.clone(),
        body: String::from_utf8_lossy(body).into_owned(),
        request_id: parts
            .headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    }
}
