//! Pass-through forwarding for requests no mock route claimed.
//!
//! # Responsibilities
//! - Forward absolute-form (proxied) requests to their own target
//! - Forward origin-form requests to the configured upstream, if any
//! - Answer 404 when there is nowhere to forward to
//!
//! # Design Decisions
//! - Bodies are already buffered; forwarding is a single attempt, no retries
//! - `Host` is left to the client so it matches the forwarding target

use std::str::FromStr;

use axum::body::{Body, Bytes};
use axum::http::header::HOST;
use axum::http::request::Parts;
use axum::http::uri::{Authority, InvalidUri, PathAndQuery, Scheme};
use axum::http::{Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;

/// Forwards unclaimed requests.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    upstream: Option<Authority>,
}

impl Forwarder {
    /// Create a forwarder; `upstream` is a `host:port` for origin-form requests.
    pub fn new(upstream: Option<&str>) -> Result<Self, InvalidUri> {
        let upstream = upstream.map(Authority::from_str).transpose()?;
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Ok(Self { client, upstream })
    }

    /// Where `uri` would be forwarded, if anywhere.
    pub fn target(&self, uri: &Uri) -> Option<Uri> {
        if uri.scheme().is_some() && uri.authority().is_some() {
            return Some(uri.clone());
        }

        let upstream = self.upstream.clone()?;
        let mut parts = uri.clone().into_parts();
        parts.scheme = Some(Scheme::HTTP);
        parts.authority = Some(upstream);
        if parts.path_and_query.is_none() {
            parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }
        Uri::from_parts(parts).ok()
    }

    /// Forward a buffered request and relay the response.
    pub async fn forward(&self, parts: Parts, body: Bytes) -> Response {
        let request_id = parts
            .headers
            .get(crate::http::request::X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        let Some(target) = self.target(&parts.uri) else {
            tracing::debug!(request_id = %request_id, uri = %parts.uri, "No route matched");
            return (StatusCode::NOT_FOUND, "No matching route found").into_response();
        };

        let mut builder = Request::builder()
            .method(parts.method.clone())
            .uri(target.clone());
        if let Some(headers) = builder.headers_mut() {
            for (name, value) in parts.headers.iter() {
                if name != HOST {
                    headers.append(name.clone(), value.clone());
                }
            }
        }

        let request = match builder.body(Body::from(body)) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!(request_id = %request_id, error = %e, "Failed to build upstream request");
                return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
            }
        };

        tracing::debug!(request_id = %request_id, target = %target, "Passing request through");

        match self.client.request(request).await {
            Ok(response) => {
                let (parts, body) = response.into_parts();
                Response::from_parts(parts, Body::new(body))
            }
            Err(e) => {
                tracing::error!(request_id = %request_id, target = %target, error = %e, "Upstream error");
                (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
            }
        }
    }
}
