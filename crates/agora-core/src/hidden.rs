//! Posts the user chose to hide from their feeds.
//!
//! Hiding is purely local: the ids live in `<base>/hidden-posts.json` and
//! the server never learns about them.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::types::Post;
use crate::config::paths;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HiddenFile {
    #[serde(default)]
    hidden_post_ids: Vec<u64>,
}

#[derive(Debug)]
pub struct HiddenPosts {
    path: PathBuf,
    ids: Vec<u64>,
}

impl HiddenPosts {
    /// # Errors
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn open_default() -> Result<Self> {
        Self::open(paths::hidden_posts_path())
    }

    /// # Errors
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let ids = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let file: HiddenFile = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            file.hidden_post_ids
        } else {
            Vec::new()
        };
        Ok(Self { path, ids })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ids in the order they were hidden.
    pub fn ids(&self) -> &[u64] {
        &self.ids
    }

    pub fn is_hidden(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    /// Hides a post. Returns false if it was already hidden.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn hide(&mut self, id: u64) -> Result<bool> {
        if self.is_hidden(id) {
            return Ok(false);
        }
        self.ids.push(id);
        self.save()?;
        Ok(true)
    }

    /// Drops hidden posts from a listing.
    pub fn filter(&self, posts: Vec<Post>) -> Vec<Post> {
        posts.into_iter().filter(|p| !self.is_hidden(p.id)).collect()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let file = HiddenFile {
            hidden_post_ids: self.ids.clone(),
        };
        let contents = serde_json::to_string(&file).context("Failed to serialize hidden posts")?;
        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write to {}", self.path.display()))
    }
}
