//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber (pretty or JSON)
//! - Emit the single request-log event for every handled request
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured level
//! - Mocked requests log at `info`, failed ones at `warn`

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;
use crate::crud::{Classification, RequestLog};

/// Install the global subscriber.
pub fn init_tracing(
    level: &str,
    format: LogFormat,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("crud_api_mock={level},tower_http={level}")));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    }
}

/// Emit the request-log entry for a handled request.
pub fn log_request(request_id: Option<&str>, log: &RequestLog) {
    let request_id = request_id.unwrap_or("-");
    let summary = log.lines.first().map(String::as_str).unwrap_or_default();

    match log.classification {
        Classification::Mocked => tracing::info!(
            request_id = %request_id,
            classification = log.classification.as_str(),
            lines = ?log.lines,
            "{}",
            summary
        ),
        Classification::Failed => tracing::warn!(
            request_id = %request_id,
            classification = log.classification.as_str(),
            lines = ?log.lines,
            "{}",
            summary
        ),
    }
}
