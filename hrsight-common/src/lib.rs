//! hrsight Common Library
//!
//! Shared plumbing for the hrsight crates:
//!
//! - [`config`] - Configuration loading (JSON5 format) and logging settings
//! - [`error`] - Error types

pub mod config;
pub mod error;

// Re-export commonly used types at the crate root
pub use config::{LogFormat, LoggingConfig, load_config, parse_config};
pub use error::{Error, Result};

/// Install the global tracing subscriber described by `config`.
///
/// A `RUST_LOG` variable in the environment replaces `config.level`.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*};

    let registry = tracing_subscriber::registry().with(log_filter(&config.level)?);

    let installed = match config.format {
        LogFormat::Text => registry.with(fmt::layer()).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json().flatten_event(true)).try_init(),
    };

    installed.map_err(|e| Error::Config(format!("Logging already initialized: {}", e)))
}

/// Filter from `RUST_LOG`, else from the configured directive.
fn log_filter(level: &str) -> Result<tracing_subscriber::EnvFilter> {
    use tracing_subscriber::EnvFilter;

    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level)
        .map_err(|e| Error::Config(format!("Invalid log level '{}': {}", level, e)))
}
