//! Persisted token storage.
//!
//! Stores the token pair in `<base>/auth-storage.json` with restricted
//! permissions (0600). The current user is deliberately not part of this
//! file and has to be fetched again after a restart.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::paths;

/// On-disk shape of the token file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTokens {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl StoredTokens {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Token store backed by a file, or purely in memory.
#[derive(Debug, Default)]
pub struct TokenStore {
    path: Option<PathBuf>,
    tokens: StoredTokens,
}

impl TokenStore {
    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens the store at the default location (`$AGORA_HOME/auth-storage.json`).
    ///
    /// # Errors
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn open_default() -> Result<Self> {
        Self::open(paths::auth_storage_path())
    }

    /// Opens the store at `path`, loading tokens if the file exists.
    ///
    /// # Errors
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let tokens = load(&path)?;
        Ok(Self {
            path: Some(path),
            tokens,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn tokens(&self) -> &StoredTokens {
        &self.tokens
    }

    /// Replaces the stored tokens and persists them.
    ///
    /// The in-memory value is updated even when writing fails.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn replace(&mut self, tokens: StoredTokens) -> Result<()> {
        self.tokens = tokens;
        self.save()
    }

    /// Replaces only the access token, keeping the refresh token.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn set_access_token(&mut self, access: &str) -> Result<()> {
        self.tokens.access_token = Some(access.to_string());
        self.save()
    }

    /// Forgets both tokens. Returns whether anything was stored.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn clear(&mut self) -> Result<bool> {
        let had_tokens = !self.tokens.is_empty();
        self.tokens = StoredTokens::default();
        self.save()?;
        Ok(had_tokens)
    }

    fn save(&self) -> Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(&self.tokens).context("Failed to serialize tokens")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)
                .with_context(|| format!("Failed to open {} for writing", path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(path, contents)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        Ok(())
    }
}

fn load(path: &Path) -> Result<StoredTokens> {
    if !path.exists() {
        return Ok(StoredTokens::default());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read tokens from {}", path.display()))?;
    if contents.trim().is_empty() {
        return Ok(StoredTokens::default());
    }

    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse tokens from {}", path.display()))
}

/// Returns a masked version of a token for display (first 12 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.len() <= 16 {
        return "***".to_string();
    }
    match token.get(..12) {
        Some(prefix) => format!("{prefix}..."),
        None => "***".to_string(),
    }
}
