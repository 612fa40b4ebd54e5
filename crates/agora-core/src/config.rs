//! Configuration management for agora.
//!
//! Loads configuration from ${AGORA_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides the configured API base URL.
pub const API_URL_ENV: &str = "AGORA_API_URL";

/// Default API base URL (local development backend).
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api/";

fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for agora configuration and data files.
    //!
    //! `AGORA_HOME` resolution order:
    //! 1. `AGORA_HOME` environment variable (if set)
    //! 2. ~/.config/agora (default)

    use std::path::PathBuf;

    /// Returns the agora home directory.
    ///
    /// Checks `AGORA_HOME` first, falls back to ~/.config/agora and finally
    /// to a relative `.agora` directory when no home directory is known.
    pub fn agora_home() -> PathBuf {
        if let Ok(home) = std::env::var("AGORA_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".agora"),
            |h| h.join(".config").join("agora"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        agora_home().join("config.toml")
    }

    /// Returns the path to the persisted token file.
    pub fn auth_storage_path() -> PathBuf {
        agora_home().join("auth-storage.json")
    }

    /// Returns the path to the hidden posts list.
    pub fn hidden_posts_path() -> PathBuf {
        agora_home().join("hidden-posts.json")
    }

    /// Returns the directory log files are written to.
    pub fn logs_dir() -> PathBuf {
        agora_home().join("logs")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the platform API
    pub api_url: String,

    /// Timeout for ordinary requests, in seconds (0 disables it)
    pub request_timeout_secs: u64,

    /// Timeout for the token refresh call, in seconds (0 disables it)
    pub refresh_timeout_secs: u64,
}

impl Config {
    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
    const DEFAULT_REFRESH_TIMEOUT_SECS: u64 = 30;

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    ///
    /// # Errors
    /// Returns an error if the file exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Resolves the effective API base URL (env > config > default).
    ///
    /// # Errors
    /// Returns an error if the chosen URL is not a valid absolute URL.
    pub fn effective_api_url(&self) -> Result<String> {
        resolve_base_url(Some(&self.api_url), API_URL_ENV, DEFAULT_API_URL)
    }

    /// Timeout applied to ordinary requests, if any.
    pub fn request_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.request_timeout_secs)
    }

    /// Timeout applied to the refresh call, if any.
    pub fn refresh_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.refresh_timeout_secs)
    }

    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            refresh_timeout_secs: Self::DEFAULT_REFRESH_TIMEOUT_SECS,
        }
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Resolves a base URL with precedence: env > config > default.
///
/// # Errors
/// Returns an error if the selected value is not a valid URL.
pub fn resolve_base_url(
    config_base_url: Option<&str>,
    env_var: &str,
    default_url: &str,
) -> Result<String> {
    if let Ok(env_url) = std::env::var(env_var) {
        let trimmed = env_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed)?;
            return Ok(trimmed.to_string());
        }
    }

    if let Some(config_url) = config_base_url {
        let trimmed = config_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed)?;
            return Ok(trimmed.to_string());
        }
    }

    Ok(default_url.to_string())
}

fn validate_url(url: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid API base URL: {url}"))?;
    Ok(())
}
