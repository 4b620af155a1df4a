use crate::error::{ControlError, Result};
use serde::Deserialize;

/// Where the control channel connects and how patiently it retries.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_retry_interval")]
    pub retry_interval_secs: u64,
}

fn default_host() -> String {
    "localhost:8080".to_string()
}

fn default_path() -> String {
    "/echo".to_string()
}

fn default_retry_interval() -> u64 {
    15
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            path: default_path(),
            retry_interval_secs: default_retry_interval(),
        }
    }
}

impl ChannelConfig {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ControlError::Config(format!("failed to read '{path}': {e}")))?;
        let mut config: Self =
            toml::from_str(&content).map_err(|e| ControlError::Config(e.to_string()))?;
        config.fill_defaults();
        Ok(config)
    }

    /// Replaces unset values with the documented defaults, mirroring what
    /// deserialization does for missing keys.
    pub fn fill_defaults(&mut self) {
        if self.host.is_empty() {
            self.host = default_host();
        }
        if self.path.is_empty() {
            self.path = default_path();
        }
        if self.retry_interval_secs == 0 {
            self.retry_interval_secs = default_retry_interval();
        }
    }

    /// WebSocket URL for the controller endpoint.
    pub fn url(&self) -> String {
        let host = self.host.trim();
        if host.contains("://") {
            return format!("{host}{}", self.path);
        }
        format!("ws://{host}{}", self.path)
    }
}
