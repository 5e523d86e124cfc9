//! Mock CRUD API server.
//!
//! Serves CRUD APIs over in-memory JSON datasets, described by API
//! definition files, optionally protected by bearer-token auth.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                  MOCK SERVER                      │
//!                        │                                                   │
//!   Client Request       │  ┌────────┐   ┌──────────┐   ┌────────────────┐  │
//!   ─────────────────────┼─▶│  http  │──▶│ pipeline │──▶│  auth (API,    │  │
//!                        │  │ server │   │  engine  │   │  then route)   │  │
//!                        │  └────────┘   └────┬─────┘   └───────┬────────┘  │
//!                        │                    │                 ▼           │
//!                        │                    │         ┌──────────────┐    │
//!                        │                    │         │   routing    │    │
//!                        │                    │         └──────┬───────┘    │
//!                        │                    │                ▼           │
//!   Client Response      │  ┌────────┐        │         ┌──────────────┐    │
//!   ◀────────────────────┼──│response│◀───────┴─────────│ crud + store │    │
//!                        │  └────────┘   unclaimed:     └──────────────┘    │
//!                        │               forward.rs ─────────────────────────┼──▶ upstream
//!                        │                                                   │
//!                        │  config (TOML + API JSON, hot reload) │ discovery │
//!                        │  observability (tracing, metrics)     │ lifecycle │
//!                        └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use crud_api_mock::auth::{discovery, AuthorizationEvaluator, KeyStore};
use crud_api_mock::config::validation::validate_config;
use crud_api_mock::config::{load_config, ApiConfig, ApiWatcher, ConfigError, ServerConfig};
use crud_api_mock::lifecycle::{signals, startup, Shutdown};
use crud_api_mock::observability::{logging, metrics};
use crud_api_mock::{HttpServer, MockEngine};

#[derive(Parser, Debug)]
#[command(name = "crud-api-mock", version)]
#[command(about = "Mock CRUD APIs over JSON datasets", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API definition file; may be repeated
    #[arg(long = "api-file")]
    api_files: Vec<PathBuf>,

    /// Bind address override (e.g. 127.0.0.1:8000)
    #[arg(long)]
    bind: Option<String>,

    /// Log level override
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ServerConfig::default(),
        };

        config.apis.extend(self.api_files.into_iter().map(ApiConfig::new));
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init_tracing(&config.observability.log_level, config.observability.log_format)?;
    tracing::info!("crud-api-mock v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        apis = config.apis.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let keys = Arc::new(KeyStore::new());
    if config.oidc.enabled {
        discovery::spawn_key_refresh(keys.clone(), config.oidc.clone(), shutdown.subscribe());
    } else {
        tracing::warn!("OIDC discovery disabled; signature-validated tokens will be rejected");
    }

    let engine = Arc::new(MockEngine::new(
        startup::load_apis(&config.apis),
        AuthorizationEvaluator::new(keys),
    ));

    let (update_tx, update_rx) = ApiWatcher::channel();
    let _watchers = startup::start_watchers(&config.apis, &update_tx);
    startup::spawn_reload_loop(engine.clone(), update_rx, shutdown.subscribe());

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(&config, engine)?;
    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
