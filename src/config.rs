use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "~/.slack-suppressor.toml";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Channel and group names whose messages are marked as read
    #[serde(alias = "Keywords")]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub slack: SlackConfig,
    #[serde(default)]
    pub suppressor: SuppressorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SlackConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,
    /// Keepalive period; a session silent for two periods is reconnected
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            request_timeout_secs: default_request_timeout_secs(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
            ping_interval_secs: default_ping_interval_secs(),
        }
    }
}

impl SlackConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs.max(1))
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SuppressorConfig {
    #[serde(default)]
    pub on_mark_error: MarkErrorPolicy,
}

/// What to do with an assembled record when the read mark could not be set.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MarkErrorPolicy {
    /// Log the failure and drop the record
    #[default]
    Discard,
    /// Log the failure and still write the record
    Emit,
}

fn default_api_base() -> String {
    "https://slack.com/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_reconnect_delay_secs() -> u64 {
    5
}

fn default_ping_interval_secs() -> u64 {
    30
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &content)
    }

    fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
