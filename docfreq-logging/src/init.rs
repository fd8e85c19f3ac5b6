//! Global subscriber initialization

use anyhow::Result;
use docfreq_config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Filter from the configured level plus any extra directives
///
/// Falls back to `RUST_LOG`, then to `info`, if the directives do not parse.
pub fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    let directives = match &config.filter {
        Some(extra) => format!("{},{}", config.level, extra),
        None => config.level.to_string(),
    };

    EnvFilter::try_new(directives)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber described by `config`
///
/// Does nothing if a global subscriber is already set, so repeated calls
/// from tests are harmless.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(build_env_filter(config));

    let installed = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().with_current_span(false).try_init(),
    };

    if installed.is_err() {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(())
}
