use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::storage_context;

/// File-backed key/value storage for client state (the local-storage analogue)
pub struct SessionStorage {
    storage_dir: PathBuf,
}

impl SessionStorage {
    /// Create a storage instance, creating the directory if needed
    pub fn new<P: AsRef<Path>>(storage_dir: P) -> Result<Self> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        fs::create_dir_all(&storage_dir).context("Failed to create session storage directory")?;
        Ok(Self { storage_dir })
    }

    pub fn save<T: Serialize>(&self, key: &str, data: &T) -> Result<()> {
        let file_path = self.build_path(key);
        let json = serde_json::to_string_pretty(data).context("Failed to serialize session data")?;
        fs::write(&file_path, json).with_context(|| storage_context("write", key))?;

        info!("Saved {} to {}", key, file_path.display());
        Ok(())
    }

    /// Load a value; a missing or unreadable entry counts as absent
    pub fn load<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        let file_path = self.build_path(key);
        if !file_path.exists() {
            return None;
        }

        match self.read_json(&file_path) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!("Ignoring corrupt session entry {}: {:#}", key, e);
                None
            }
        }
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let file_path = self.build_path(key);
        if file_path.exists() {
            fs::remove_file(&file_path).with_context(|| storage_context("remove", key))?;
            info!("Removed {}", file_path.display());
        }
        Ok(())
    }

    pub fn exists(&self, key: &str) -> bool {
        self.build_path(key).exists()
    }

    // --- Helper Methods ---

    fn build_path(&self, key: &str) -> PathBuf {
        self.storage_dir.join(format!("{}.json", key))
    }

    fn read_json<T: for<'de> Deserialize<'de>>(&self, path: &Path) -> Result<T> {
        let json = fs::read_to_string(path)?;
        serde_json::from_str(&json).with_context(|| {
            format!(
                "Failed to parse JSON from {:?}. First 200 chars: {}",
                path,
                json.chars().take(200).collect::<String>()
            )
        })
    }
}
