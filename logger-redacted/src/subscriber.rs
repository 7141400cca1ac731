use crate::config::LoggerConfig;
use crate::error::{LoggerError, Result};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber. Logs go to stderr so command
/// output on stdout stays machine-readable.
pub fn init_logging(config: &LoggerConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_level).map_err(|e| LoggerError::InvalidFilter {
        filter: config.log_level.clone(),
        reason: e.to_string(),
    })?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json_output {
        registry
            .with(JsonStorageLayer)
            .with(BunyanFormattingLayer::new(
                config.service_name.clone(),
                std::io::stderr,
            ))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    installed.map_err(|e| LoggerError::AlreadyInitialized(e.to_string()))
}
