//! Environment-driven configuration.
//!
//! # Environment Variables
//!
//! - `DIARY_DIR`: directory holding `diaryEntries.json` and `diary.log` (defaults to the current directory)
//! - `DIARY_OPENAI_API_KEY`, falling back to `OPENAI_API_KEY`: credential for grammar checks
//! - `DIARY_API_BASE`: chat-completion base URL (defaults to `https://api.openai.com/v1`)
//! - `DIARY_MODEL`: model name (defaults to `gpt-3.5-turbo`)
//! - `DIARY_GRAMMAR_TIMEOUT_SECS`: request timeout in seconds (defaults to 30)
//! - `DIARY_LOG`: tracing filter directive (defaults to `info`)

use crate::errors::{DiaryError, DiaryResult};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    /// Only needed for grammar checks, so its absence is not an error at start-up.
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub grammar_timeout: Duration,
    pub log_filter: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("data_dir", &self.data_dir)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("grammar_timeout", &self.grammar_timeout)
            .field("log_filter", &self.log_filter)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from("."),
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            grammar_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    pub fn load() -> DiaryResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> DiaryResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Config::default();

        let grammar_timeout = match get("DIARY_GRAMMAR_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(DiaryError::Configuration(format!(
                        "DIARY_GRAMMAR_TIMEOUT_SECS must be a positive number of seconds, got '{raw}'"
                    )))
                }
            },
            None => defaults.grammar_timeout,
        };

        Ok(Config {
            data_dir: get("DIARY_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            api_key: get("DIARY_OPENAI_API_KEY").or_else(|| get("OPENAI_API_KEY")),
            api_base: get("DIARY_API_BASE").unwrap_or(defaults.api_base),
            model: get("DIARY_MODEL").unwrap_or(defaults.model),
            grammar_timeout,
            log_filter: get("DIARY_LOG").unwrap_or(defaults.log_filter),
        })
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("diary.log")
    }
}
