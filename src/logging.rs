//! Tracing subscriber setup shared by both binaries

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogConfig, LogFormat};
use crate::error::{BridgeError, Result};

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init_tracing(log: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(&log.level)
            .map_err(|e| BridgeError::InvalidConfig(format!("invalid log level '{}': {}", log.level, e)))
    })?;

    let json = log.format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .try_init()
        .map_err(|e| BridgeError::Internal(format!("failed to install tracing subscriber: {}", e)))
}
