//! Tracing subscriber setup for the headless client.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Platform cache location for `SKIRMISH_LOG_FILE=default`.
///
/// - macOS: `~/Library/Caches/skirmish/logs/skirmish.log`
/// - Linux: `~/.cache/skirmish/logs/skirmish.log` (or `$XDG_CACHE_HOME/...`)
/// - Windows: `%LOCALAPPDATA%\skirmish\cache\logs\skirmish.log`
/// - Fallback: `/tmp/skirmish/logs/skirmish.log`
pub fn default_log_file() -> PathBuf {
    directories::ProjectDirs::from("", "", "skirmish")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/skirmish"))
        .join("logs")
        .join("skirmish.log")
}

/// Installs a stderr layer and, when `log_file` is set, a non-blocking file layer.
///
/// `RUST_LOG` overrides the default `info` level. Keep the returned guard
/// alive for the whole run or buffered file output is lost.
pub fn setup_logging(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let file_name = path
                .file_name()
                .context("SKIRMISH_LOG_FILE must name a file")?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if let Some(path) = log_file {
        tracing::info!("Log file: {}", path.display());
    }
    Ok(guard)
}
