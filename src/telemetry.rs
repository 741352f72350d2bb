//! Tracing subscriber setup for the service binary.

use crate::config::{LogFormat, LoggingSettings};
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `settings.level`; an unparsable level falls back to
/// `info`.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(settings: &LoggingSettings) -> anyhow::Result<()> {
    let filter = env_filter(&settings.level);
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let installed = match settings.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("tracing subscriber already set: {e}"))
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
