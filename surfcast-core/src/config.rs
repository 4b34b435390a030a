use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_url = "https://api.stormglass.io/v2"
/// api_token = "..."
/// source = "noaa"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// StormGlass API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Authorization token, sent verbatim in the `Authorization` header.
    pub api_token: Option<String>,

    /// Preferred source identifier; every field of every point is resolved
    /// against this one source.
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_api_url() -> String {
    "https://api.stormglass.io/v2".to_string()
}

fn default_source() -> String {
    "noaa".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_token: None,
            source: default_source(),
        }
    }
}

impl Config {
    /// Load config from disk, or return the defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "surfcast", "surfcast-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set or replace the API token.
    pub fn set_api_token(&mut self, token: String) {
        self.api_token = Some(token);
    }

    /// Returns the API token, if present.
    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }

    pub fn is_configured(&self) -> bool {
        self.api_token().is_some_and(|t| !t.is_empty())
    }
}
