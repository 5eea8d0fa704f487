//! Logging setup for both binaries.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const HOST_LOG_FILE: &str = "native_host.log";
pub const ENV_LOG_DIR: &str = "FORMFILL_LOG_DIR";

fn level_filter(level: &str, debug: bool) -> Result<EnvFilter> {
    let level: tracing::Level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };
    Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string())))
}

/// Console logging for the CLI. `RUST_LOG` wins over `level`.
pub fn init_logging(level: &str, debug: bool) -> Result<()> {
    tracing_subscriber::registry()
        .with(level_filter(level, debug)?)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

/// File logging for the native host; stdout carries the message protocol.
///
/// The returned guard flushes the writer on drop and must outlive the host.
pub fn init_file_logging(dir: &Path, level: &str) -> Result<WorkerGuard> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, HOST_LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(level_filter(level, false)?)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();

    Ok(guard)
}

/// Directory for the host log: `FORMFILL_LOG_DIR`, else the local data
/// directory, else the working directory.
pub fn host_log_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(ENV_LOG_DIR).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::data_local_dir()
        .map(|dir| dir.join("formfill"))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_level() {
        assert!(level_filter("chatty", false).is_err());
        assert!(level_filter("chatty", true).is_ok());
    }
}
