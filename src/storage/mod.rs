// src/storage/mod.rs
pub mod template;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::utils::error::StorageError;

/// Writes rendered pages under a base directory.
pub struct StorageManager {
    pages_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified pages directory.
    pub fn new<P: AsRef<Path>>(pages_dir: P) -> Result<Self, StorageError> {
        let pages_dir = pages_dir.as_ref().to_path_buf();
        if !pages_dir.exists() {
            fs::create_dir_all(&pages_dir)?;
        }
        Ok(Self { pages_dir })
    }

    /// Writes the rendered page as `<slug>.astro`, replacing any previous
    /// version in place.
    pub fn save_page(&self, slug: &str, content: &str) -> Result<PathBuf, StorageError> {
        let file_path = self.pages_dir.join(format!("{}.astro", slug));
        fs::write(&file_path, content)?;
        tracing::info!("Saved page to {}", file_path.display());
        Ok(file_path)
    }

    /// Removes the page file for a slug that is no longer current.
    pub fn delete_page(&self, slug: &str) -> Result<bool, StorageError> {
        let file_path = self.pages_dir.join(format!("{}.astro", slug));
        if file_path.exists() {
            fs::remove_file(&file_path)?;
            tracing::info!("Deleted stale page {}", file_path.display());
            return Ok(true);
        }
        Ok(false)
    }
}

/// One generated page, keyed in the registry by its source page id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryEntry {
    pub slug: String,
    pub title: String,
    pub date: String,
    pub updated_at: String,
}

/// JSON index of generated pages, keyed by the stable Notion page id.
/// Supports update-in-place; a slug change surfaces the stale slug so the
/// caller can delete the orphaned file.
#[derive(Debug, Default)]
pub struct PageRegistry {
    path: PathBuf,
    entries: BTreeMap<String, RegistryEntry>,
}

impl PageRegistry {
    /// Loads the registry file, or starts empty if it does not exist yet.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw).map_err(|e| StorageError::Serialization(e.to_string()))?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    /// Records (or updates) the entry for a page. Returns the previous slug
    /// when it differs from the new one, i.e. when a stale file exists.
    pub fn record(&mut self, page_id: &str, entry: RegistryEntry) -> Option<String> {
        let previous = self.entries.insert(page_id.to_string(), entry);
        match previous {
            Some(old) if old.slug != self.entries[page_id].slug => Some(old.slug),
            _ => None,
        }
    }

    pub fn get(&self, page_id: &str) -> Option<&RegistryEntry> {
        self.entries.get(page_id)
    }

    pub fn save(&self) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(&self.path, raw)?;
        tracing::debug!("Registry saved to {}", self.path.display());
        Ok(())
    }
}
