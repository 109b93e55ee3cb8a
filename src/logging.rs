//! Tracing setup: compact terminal output plus a daily-rotated log file.
//!
//! Log level filtering follows `RUST_LOG` (default "info"), e.g.
//! `RUST_LOG=campus_crawler=debug` for verbose crawl diagnostics.

use std::path::Path;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize the tracing subscriber.
///
/// Writes human-readable logs to `<log_dir>/crawler.log` (rotated daily)
/// and a compact stream to stdout.
///
/// # Panics
/// Panics if the subscriber is already initialized.
pub fn init_logging<P: AsRef<Path>>(log_dir: P) -> Result<(), Box<dyn std::error::Error>> {
    let log_path = log_dir.as_ref();
    std::fs::create_dir_all(log_path)?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .expect("Failed to create EnvFilter");

    let file_appender = tracing_appender::rolling::daily(log_path, "crawler.log");
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_filter(env_filter.clone());

    let stdout_layer = fmt::layer()
        .with_target(false)
        .compact()
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .init();

    // The guard must outlive the process for the background writer to
    // keep flushing.
    Box::leak(Box::new(file_guard));

    tracing::debug!(dir = %log_path.display(), "logging initialized");

    Ok(())
}
