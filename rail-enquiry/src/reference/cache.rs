//! Disk cache for reference lists.
//!
//! A cache file, once written, is trusted until something deletes it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::error::ReferenceError;

/// One reference list cached as a JSON object of key → full entry.
#[derive(Debug, Clone)]
pub struct ReferenceCache {
    path: PathBuf,
}

impl ReferenceCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Whether the cache file exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the cached mapping.
    ///
    /// Returns `Ok(None)` if there is no cache file. A file that exists but
    /// cannot be read or parsed is an error.
    pub fn load(&self) -> Result<Option<BTreeMap<String, String>>, ReferenceError> {
        if !self.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path).map_err(|e| ReferenceError::Cache {
            message: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let map = serde_json::from_str(&contents).map_err(|e| ReferenceError::Cache {
            message: format!("failed to parse {}: {}", self.path.display(), e),
        })?;

        Ok(Some(map))
    }

    /// Save the mapping, creating parent directories if they don't exist.
    pub fn save(&self, map: &BTreeMap<String, String>) -> Result<(), ReferenceError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ReferenceError::Cache {
                message: format!("failed to create cache directory: {}", e),
            })?;
        }

        let json = serde_json::to_string(map).map_err(|e| ReferenceError::Cache {
            message: format!("failed to serialize cache: {}", e),
        })?;

        std::fs::write(&self.path, json).map_err(|e| ReferenceError::Cache {
            message: format!("failed to write cache file: {}", e),
        })?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
