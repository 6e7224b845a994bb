use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::provider::OwnershipType;

/// Main configuration structure for repoflags
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    /// GitHub authentication and endpoint settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Repository listing defaults
    #[serde(default)]
    pub listing: ListingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// GitHub configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GitHubConfig {
    /// Authentication method
    #[serde(default = "default_auth_method")]
    pub auth_method: String, // "auto", "gh_cli", "token"

    /// API base URL, for GitHub Enterprise (public API if null)
    #[serde(default)]
    pub api_url: Option<String>,
}

/// Listing defaults applied when the command line doesn't say otherwise
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ListingConfig {
    /// Ownership type requested from GitHub
    #[serde(default)]
    pub ownership: OwnershipType,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level, overridden by RUST_LOG and --verbose
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_auth_method() -> String {
    "auto".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            auth_method: default_auth_method(),
            api_url: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating a default config
    /// file when none exists. The path is returned when a file was created.
    pub fn load_or_create() -> Result<(Self, Option<PathBuf>)> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            return Ok((Self::load(&config_path)?, None));
        }

        let config = Self::default();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        config.save(&config_path)?;
        Ok((config, Some(config_path)))
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Get the default configuration file path (XDG compliant)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to get user config directory")?;

        Ok(config_dir.join("repoflags").join("config.yml"))
    }

    fn validate(&self) -> Result<()> {
        match self.github.auth_method.as_str() {
            "auto" | "gh_cli" | "token" => Ok(()),
            other => anyhow::bail!(
                "Unknown auth method '{}' (expected auto, gh_cli or token)",
                other
            ),
        }
    }
}
