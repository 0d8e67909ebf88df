//! Configuration loading for pubgraph.
//! Reads pubgraph.toml from the current directory or the path in PUBGRAPH_CONFIG.

use anyhow::Context;
use pubgraph_eutils::EutilsConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATH: &str = "pubgraph.toml";
const API_KEY_ENV: &str = "PUBGRAPH_NCBI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub eutils: EutilsConfig,
}

fn default_log_level() -> String { "info".to_string() }

impl Default for Config {
    fn default() -> Self {
        Self { log_level: default_log_level(), eutils: EutilsConfig::default() }
    }
}


impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Otherwise PUBGRAPH_CONFIG is checked, then
    /// ./pubgraph.toml; when neither exists the defaults are used.
    /// PUBGRAPH_NCBI_API_KEY overrides `eutils.api_key`.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = std::env::var("PUBGRAPH_CONFIG")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.eutils.api_key = Some(key.trim().to_string());
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.eutils.timeout_secs == 0 {
            anyhow::bail!("eutils.timeout_secs must be greater than 0");
        }
        if self.eutils.tool.trim().is_empty() {
            anyhow::bail!("eutils.tool must not be empty; NCBI asks clients to identify themselves");
        }
        Ok(())
    }
}
