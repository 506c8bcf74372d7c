//! Client configuration.
//!
//! Mirrors `config.toml`. Every field has a default so an empty or missing
//! file yields a working configuration.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ParleyConfig {
    pub api: ApiConfig,
    pub polling: PollingConfig,
    pub text: TextConfig,
    pub log: LogConfig,
}

impl ParleyConfig {
    /// Parses a `config.toml` document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
        }
    }
}

/// `[polling]` section, in milliseconds.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PollingConfig {
    pub initial_delay_ms: u64,
    pub interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        let policy = PollPolicy::default();
        Self {
            initial_delay_ms: policy.initial_delay.as_millis() as u64,
            interval_ms: policy.interval.as_millis() as u64,
            max_attempts: policy.max_attempts,
        }
    }
}

impl From<&PollingConfig> for PollPolicy {
    fn from(config: &PollingConfig) -> Self {
        Self {
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            interval: Duration::from_millis(config.interval_ms),
            max_attempts: config.max_attempts.max(1),
        }
    }
}

/// Timing of the document status poll.
///
/// Defaults: first check after 1s, then every 2s, at most 60 checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub initial_delay: Duration,
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            interval: Duration::from_secs(2),
            max_attempts: 60,
        }
    }
}

/// User-visible strings the orchestrator writes into the transcript.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TextConfig {
    /// Answer shown while a send is in flight
    pub processing_placeholder: String,
    /// Answer substituted when a send fails
    pub send_failure: String,
    /// Session label when neither title nor date is known
    pub untitled_session: String,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            processing_placeholder: "Đang xử lý...".to_string(),
            send_failure: "Lỗi khi gửi tin nhắn. Vui lòng thử lại.".to_string(),
            untitled_session: "Phiên mới".to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing-subscriber` filter directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}
