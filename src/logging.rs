//! Logging configuration using the tracing framework
//!
//! Logs are filtered through the `RUST_LOG` environment variable.
//! CLI commands log to stderr so stdout stays clean for command output;
//! the interactive UI logs to a rolling file because the terminal is taken.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "locbook=warn";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Initialize stderr logging for one-shot CLI commands
///
/// # Environment Variables
///
/// - `RUST_LOG`: Controls log level (default: `locbook=warn`)
///   - `RUST_LOG=locbook=debug` - debug logs for the whole crate
///   - `RUST_LOG=locbook::controller=trace` - dispatch tracing only
pub fn init() {
    tracing_subscriber::registry()
        .with(env_filter(DEFAULT_FILTER))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_line_number(true)
                .with_file(false),
        )
        .init();
}

/// Initialize logging into a daily rolling file under `log_dir`
///
/// The returned guard flushes pending records when dropped, so the caller
/// must keep it alive for the lifetime of the UI.
pub fn init_with_file(log_dir: &Path, log_file_name: &str) -> std::io::Result<WorkerGuard> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};

    std::fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, log_file_name);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter("locbook=info"))
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    Ok(guard)
}

/// Initialize logging for tests
///
/// Only errors are shown by default.
pub fn init_test() {
    tracing_subscriber::registry()
        .with(env_filter("error"))
        .with(fmt::layer().with_test_writer())
        .try_init()
        .ok(); // Ignore errors if already initialized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_is_idempotent() {
        init_test();
        init_test();
    }

    #[test]
    fn test_structured_logging() {
        init_test();
        tracing::info!(location_id = "a1b2c", rate = 4, "Structured log message");
    }
}
