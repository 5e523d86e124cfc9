//! Mock CRUD API server library.

pub mod auth;
pub mod config;
pub mod crud;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;
pub mod routing;
pub mod store;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use pipeline::{MockApi, MockEngine, MockRequest};
