use crate::error::{PipelineError, Result};
use crate::filter::Filter;
use serde::Deserialize;
use std::collections::HashMap;

/// Immutable configuration for one running input, bound at agent startup.
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Plugin configuration name, also the `input` tag on self-stats.
    pub name: String,
    /// Replaces the measurement name entirely; wins over prefix/suffix.
    #[serde(default)]
    pub name_override: Option<String>,
    #[serde(default)]
    pub measurement_prefix: String,
    #[serde(default)]
    pub measurement_suffix: String,
    /// Static tags applied to every metric this plugin produces.
    #[serde(default)]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub filter: Filter,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_interval_secs() -> u64 {
    10
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            name_override: None,
            measurement_prefix: String::new(),
            measurement_suffix: String::new(),
            tags: HashMap::new(),
            filter: Filter::default(),
            interval_secs: default_interval_secs(),
        }
    }
}

impl InputConfig {
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|source| PipelineError::ConfigRead {
                path: path.to_string(),
                source,
            })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
