#[cfg(test)]
#[path = "file_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::fs;
use std::path;

use anyhow::Result;

use crate::domain::models::KeyValueStore;

/// JSON object on disk, loaded once and rewritten on every change.
pub struct FileStore {
    path: path::PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open(path: path::PathBuf) -> Result<FileStore> {
        let mut values = BTreeMap::new();
        if path.exists() {
            let payload = fs::read_to_string(&path)?;
            if !payload.trim().is_empty() {
                values = serde_json::from_str(&payload)?;
            }
        }

        tracing::debug!(path = ?path, keys = values.len(), "Opened store");
        return Ok(FileStore { path, values });
    }

    pub fn path(&self) -> &path::Path {
        return &self.path;
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let payload = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, payload)?;

        return Ok(());
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        return self.values.get(key).cloned();
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        return self.flush();
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_none() {
            return Ok(());
        }

        return self.flush();
    }
}
