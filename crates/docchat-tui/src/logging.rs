use std::fs;
use std::path::PathBuf;
use anyhow::{Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `DOCCHAT_LOG=debug`.
pub const LOG_ENV: &str = "DOCCHAT_LOG";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default))
}

pub fn log_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow!("Could not determine data directory"))?;

    Ok(data_dir.join("docchat"))
}

/// Log to `<data dir>/docchat/docchat.log`. The terminal belongs to the UI
/// while the TUI runs, so nothing may go to stderr.
///
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn init_file() -> Result<WorkerGuard> {
    let dir = log_dir()?;
    fs::create_dir_all(&dir)?;

    let appender = tracing_appender::rolling::never(&dir, "docchat.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter("info"))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("failed to install logger: {}", e))?;

    Ok(guard)
}

/// Log warnings and errors to stderr for the one-shot commands.
pub fn init_stderr() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter("warn"))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to install logger: {}", e))
}
