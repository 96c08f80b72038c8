//! # Structured Logging Module
//!
//! Environment-aware structured logging for traversal and import runs.
//! Output is human-readable by default; JSON when configured.

use crate::config::{LogFormat, LoggingConfig};
use std::sync::OnceLock;
use tracing::Subscriber;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging; later calls are no-ops
pub fn init_structured_logging(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let default_level = config
            .level
            .clone()
            .unwrap_or_else(|| get_log_level(&environment));

        // RUST_LOG wins over the configured level
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level.clone()));

        // A global subscriber may already be installed by an embedding host
        if build_subscriber(config.format, filter).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already set, keeping the existing one");
        }

        tracing::info!(
            environment = %environment,
            level = %default_level,
            format = ?config.format,
            "Structured logging initialized"
        );
    });
}

fn build_subscriber(format: LogFormat, filter: EnvFilter) -> impl Subscriber + Send + Sync {
    let layer = match format {
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_level(true)
            .with_ansi(true)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_level(true)
            .with_ansi(false)
            .json()
            .boxed(),
    };

    tracing_subscriber::registry().with(layer.with_filter(filter))
}

/// Current environment: `PARTITION_ENV`, then `APP_ENV`, then `development`
pub fn get_environment() -> String {
    std::env::var("PARTITION_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Default filter directive for an environment
pub fn get_log_level(environment: &str) -> String {
    match environment {
        "test" => "debug".to_string(),
        "development" => "debug".to_string(),
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}
