use anyhow::{anyhow, Context};
use reqwest::Url;

use crate::{api::DEFAULT_BASE_URL, RecorderError};

/// Settings read from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Where the game backend lives, without a trailing slash.
    pub api_url: String,
    /// Forward the operator's game time in the `timestamp` field of `POST /games`.
    pub send_timestamp: bool,
    /// Refuse to submit games the backend would reject.
    pub strict: bool,
    /// Where release builds write their logs.
    pub log_file: String,
}

impl Config {
    pub fn from_env() -> Result<Self, RecorderError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Unset keys fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RecorderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("RECORDER_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Url::parse(&api_url).with_context(|| format!("RECORDER_API_URL is not a URL: {}", api_url))?;

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            send_timestamp: parse_flag("RECORDER_SEND_TIMESTAMP", lookup("RECORDER_SEND_TIMESTAMP"))?,
            strict: parse_flag("RECORDER_STRICT", lookup("RECORDER_STRICT"))?,
            log_file: lookup("RECORDER_LOG_FILE").unwrap_or_else(|| "recorder.log".to_string()),
        })
    }
}

fn parse_flag(key: &str, value: Option<String>) -> Result<bool, RecorderError> {
    let Some(value) = value else {
        return Ok(false);
    };

    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("{} must be a boolean, got {:?}", key, other)),
    }
}
