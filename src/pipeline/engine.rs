//! Request pipeline.
//!
//! # Responsibilities
//! - Pick the API that owns a request
//! - Run API-level then route-level authorization
//! - Dispatch matched requests to the CRUD executor
//! - Apply CORS, emit the request log and count outcomes
//!
//! # Design Decisions
//! - The API list is swapped wholesale on reload; a request keeps the
//!   snapshot it started with
//! - The two authorization stages are independent; a route without its own
//!   requirement does not inherit the API-wide one
//! - `None` means "not ours", the transport decides what happens next

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::http::header::{AUTHORIZATION, ORIGIN};
use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::auth::{AuthError, AuthorizationEvaluator};
use crate::crud::{execute, ResponseDescriptor};
use crate::observability::{logging, metrics};
use crate::pipeline::api::MockApi;

/// A request as seen by the engine.
#[derive(Debug, Clone, Default)]
pub struct MockRequest {
    pub method: String,
    /// Request-target as received: absolute-form when proxied, origin-form otherwise.
    pub url: String,
    pub headers: HeaderMap,
    pub body: String,
    pub request_id: Option<String>,
}

impl MockRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// First value of `name`, if present and valid UTF-8.
    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Debug, Clone, Copy)]
enum AuthStage {
    Api,
    Route,
}

impl AuthStage {
    fn as_str(self) -> &'static str {
        match self {
            AuthStage::Api => "api",
            AuthStage::Route => "route",
        }
    }
}

/// Serves requests against the loaded mock APIs.
pub struct MockEngine {
    apis: ArcSwap<Vec<Arc<MockApi>>>,
    evaluator: AuthorizationEvaluator,
}

impl MockEngine {
    pub fn new(apis: Vec<MockApi>, evaluator: AuthorizationEvaluator) -> Self {
        let apis = apis.into_iter().map(Arc::new).collect::<Vec<_>>();
        Self {
            apis: ArcSwap::from_pointee(apis),
            evaluator,
        }
    }

    /// Current API snapshot, in configuration order.
    pub fn apis(&self) -> Arc<Vec<Arc<MockApi>>> {
        self.apis.load_full()
    }

    pub fn evaluator(&self) -> &AuthorizationEvaluator {
        &self.evaluator
    }

    /// Swap the API at `index`. Returns false when no such API exists.
    pub fn replace_api(&self, index: usize, api: MockApi) -> bool {
        let api = Arc::new(api);
        let mut replaced = false;

        self.apis.rcu(|current| {
            let mut next = (**current).clone();
            replaced = match next.get_mut(index) {
                Some(slot) => {
                    *slot = Arc::clone(&api);
                    true
                }
                None => false,
            };
            next
        });

        replaced
    }

    /// Handle one request. `None` means no API route matched and the
    /// request should pass through untouched.
    pub fn handle(&self, request: &MockRequest) -> Option<ResponseDescriptor> {
        let apis = self.apis.load();
        let authorization = request.header(&AUTHORIZATION);

        for api in apis.iter() {
            if !api.owns(&request.url) {
                continue;
            }

            if let Err(reason) = self.evaluator.authorize(api.auth(), authorization) {
                return Some(self.deny(request, AuthStage::Api, reason));
            }

            let Some(matched) = api.match_request(&request.method, &request.url) else {
                continue;
            };

            if let Err(reason) = self.evaluator.authorize(&matched.route.auth, authorization) {
                return Some(self.deny(request, AuthStage::Route, reason));
            }

            tracing::debug!(
                request_id = request.request_id.as_deref().unwrap_or("-"),
                action = %matched.route.action,
                url = %request.url,
                "Route matched"
            );

            let response = execute(api.store(), matched.route, &matched.params, &request.body);
            return Some(self.finish(request, response));
        }

        metrics::record_passthrough();
        None
    }

    fn deny(&self, request: &MockRequest, stage: AuthStage, reason: AuthError) -> ResponseDescriptor {
        metrics::record_auth_denied(stage.as_str());
        self.finish(request, ResponseDescriptor::unauthorized(reason.to_string()))
    }

    fn finish(&self, request: &MockRequest, response: ResponseDescriptor) -> ResponseDescriptor {
        let response = if request.headers.contains_key(ORIGIN) {
            response.with_cors()
        } else {
            response
        };

        metrics::record_request(response.log.classification, response.status.as_u16());
        logging::log_request(request.request_id.as_deref(), &response.log);
        response
    }
}
