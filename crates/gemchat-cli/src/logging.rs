//! File logging for the CLI. The TUI owns the terminal, so nothing is
//! written to stdout or stderr.

use anyhow::Result;
use gemchat_core::paths;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "gemchat.log";
const FALLBACK_DIR: &str = "gemchat-logs";

/// Install the global subscriber. Keep the guard alive until exit so
/// buffered lines are flushed.
pub fn init() -> Option<WorkerGuard> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,gemchat=debug".into()),
        )
        .with_ansi(false)
        .with_target(false)
        .with_level(true);

    match log_dir(paths::logs_dir()) {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            builder.with_writer(non_blocking).init();
            Some(guard)
        }
        None => {
            builder.with_writer(std::io::sink).init();
            None
        }
    }
}

/// The configured log directory, or a directory under the system temp dir
/// when it cannot be created.
fn log_dir(preferred: Result<PathBuf>) -> Option<PathBuf> {
    preferred.ok().or_else(|| {
        let dir = std::env::temp_dir().join(FALLBACK_DIR);
        std::fs::create_dir_all(&dir).ok().map(|_| dir)
    })
}
