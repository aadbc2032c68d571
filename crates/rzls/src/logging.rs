//! Tracing setup for the `rzls` binary.
//!
//! Events go to a daily rolling file in the configured log directory and,
//! filtered by the command line verbosity, to stderr.

use anyhow::Context;
use anyhow::Result;
use rzls_conf::Settings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;

const LOG_FILE_PREFIX: &str = "rzls.log";

/// Install the global subscriber.
///
/// Sets up:
/// - File layer: `<log_dir>/rzls.log.<date>`, filtered by `RUST_LOG`, defaulting
///   to `info` (or `debug` when `settings.debug` is set)
/// - Stderr layer: events at or above `stderr_level`
///
/// Returns a `WorkerGuard` that must be kept alive for the file logging to work.
pub fn init_tracing(settings: &Settings, stderr_level: LevelFilter) -> Result<WorkerGuard> {
    let log_dir = settings.resolved_log_dir();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {log_dir}"))?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if settings.debug { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(stderr_level);

    Registry::default()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    tracing::debug!(%log_dir, "Tracing initialized");
    Ok(guard)
}
