use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;

/// Initialize structured logging
///
/// RUST_LOG takes precedence over the configured level. Logs are written to
/// stderr so stdout stays reserved for the rendered workflow.
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()?;
    }

    tracing::debug!("Telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for linking the logs of one remote call
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Create a span around one remote call
pub fn create_request_span(operation: &str, correlation_id: &str, generation: u64) -> tracing::Span {
    tracing::info_span!(
        "remote_request",
        operation = operation,
        correlation.id = correlation_id,
        generation = generation,
    )
}
