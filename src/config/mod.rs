//! Configuration management for the Vigiles CLI

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Default service base URL
pub const DEFAULT_BASE_URL: &str = "https://linuxlink.timesys.com";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Vigiles API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Account email associated with the API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Service base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Default group token used when an operation is not given one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_token: Option<String>,

    /// Default folder token; preferred over the group token as an
    /// upload target when both are set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_token: Option<String>,

    /// Legacy product token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_token: Option<String>,

    /// Construct requests without sending them
    #[serde(default)]
    pub dry_run: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".vigiles").join("config.yaml"))
    }

    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path()?)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Validate that required configuration is present
    pub fn validate_auth(&self) -> Result<()> {
        if self.api_key.is_none() {
            return Err(ConfigError::MissingApiKey.into());
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            email: None,
            base_url: default_base_url(),
            group_token: None,
            folder_token: None,
            product_token: None,
            dry_run: false,
        }
    }
}
