use crate::config::Config;
use color_eyre::eyre::{eyre, Result, WrapErr};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{fmt, EnvFilter};

/// Sends tracing output to `diary.log` in the data directory; the terminal
/// belongs to the UI.
pub fn init(config: &Config) -> Result<()> {
    let path = config.log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .wrap_err_with(|| format!("cannot open log file {}", path.display()))?;

    let filter = EnvFilter::try_new(&config.log_filter)
        .wrap_err_with(|| format!("invalid DIARY_LOG filter '{}'", config.log_filter))?;

    fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| eyre!("logging already initialised: {e}"))
}
