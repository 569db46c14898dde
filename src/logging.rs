//! Logging setup for the `leaven` binary.
//!
//! The library only emits `tracing` events. Applications pick the subscriber; the CLI
//! calls [`init`], which logs to the console and, when a directory is configured, to
//! daily-rotated files:
//!
//! ```no_run
//! use leaven::config::LoggingConfig;
//!
//! leaven::logging::init(&LoggingConfig::default())?;
//! tracing::info!("Ready");
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! `RUST_LOG` overrides the configured level.

use crate::config::LoggingConfig;
use anyhow::{Context as _, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

/// Build the filter: `RUST_LOG` if set, else the configured level.
///
/// # Errors
///
/// Returns error if the configured level is not a valid filter directive.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .with_context(|| format!("Invalid log level: {}", config.level))
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns error if the log directory cannot be created or the file appender fails.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .boxed();

    let file_layer = match &config.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .max_log_files(10)
                .filename_prefix("leaven")
                .filename_suffix("log")
                .build(dir)
                .context("Failed to create log file appender")?;
            Some(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_ansi(false)
                    .with_writer(appender)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter(config)?)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!(directory = ?config.directory, "Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_rejects_garbage() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig {
            level: "leaven=verbose".to_owned(),
            directory: None,
        };
        assert!(env_filter(&config).is_err(), "invalid directive accepted");
        assert!(env_filter(&LoggingConfig::default()).is_ok(), "default rejected");
    }
}
