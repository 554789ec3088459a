use thiserror::Error;
use tracing_subscriber::{filter::ParseError, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log level '{level}': {source}")]
    InvalidFilter {
        level: String,
        #[source]
        source: ParseError,
    },

    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,
}

/// Install the stderr subscriber. `RUST_LOG` wins over `default_level`,
/// but `default_level` must still be a valid filter.
pub fn init(default_level: &str) -> Result<(), LoggingError> {
    let fallback = EnvFilter::try_new(default_level).map_err(|source| LoggingError::InvalidFilter {
        level: default_level.to_string(),
        source,
    })?;
    let filter = EnvFilter::try_from_default_env().unwrap_or(fallback);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)
}
