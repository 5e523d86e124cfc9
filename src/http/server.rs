//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all mock handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind server to listener with graceful shutdown
//! - Hand requests to the mock engine, forward the rest

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use http_body_util::LengthLimitError;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::forward::Forwarder;
use crate::http::request::{capture, RequestIdGenerator};
use crate::lifecycle::Shutdown;
use crate::pipeline::MockEngine;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<MockEngine>,
    pub forwarder: Forwarder,
    pub max_body_bytes: usize,
}

/// HTTP server for the mock engine.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server over `engine`.
    pub fn new(config: &ServerConfig, engine: Arc<MockEngine>) -> Result<Self, axum::http::uri::InvalidUri> {
        let state = AppState {
            engine,
            forwarder: Forwarder::new(config.upstream.address.as_deref())?,
            max_body_bytes: config.listener.max_body_bytes,
        };

        let router = Self::build_router(config, state);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(RequestIdGenerator))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        Router::new()
            .route("/{*path}", any(mock_handler))
            .route("/", any(mock_handler))
            .with_state(state)
            .layer(middleware)
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server until `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main handler.
/// Buffers the body, asks the engine, and passes unclaimed requests on.
async fn mock_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();

    let bytes = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) if exceeds_limit(&e) => {
            tracing::warn!(uri = %parts.uri, limit = state.max_body_bytes, "Request body too large");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
        Err(e) => {
            tracing::warn!(uri = %parts.uri, error = %e, "Failed to read request body");
            return (StatusCode::BAD_REQUEST, "Failed to read request body").into_response();
        }
    };

    let mock_request = capture(&parts, &bytes);
    match state.engine.handle(&mock_request) {
        Some(descriptor) => descriptor.into_response(),
        None => state.forwarder.forward(parts, bytes).await,
    }
}
/// Whether a body read failed because it hit the size limit.
fn exceeds_limit(error: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}
