//! FileBackend: key-value storage persisted as one JSON document
//!
//! The whole map is kept in memory and rewritten on every mutation.
//! Writes are atomic: the document goes to a temp file which is fsynced and
//! renamed over the target, so a crash leaves either the old or the new map,
//! never a torn one.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::debug;

use kwest_core::{Error, KeyValueBackend, Result};

/// Key-value backend stored in a single JSON file.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    data: RwLock<BTreeMap<String, String>>,
}

impl FileBackend {
    /// Open the backend at `path`, loading existing contents if the file
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is not a
    /// JSON object of strings.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    Error::backend(format!(
                        "Failed to parse storage file '{}': {}",
                        path.display(),
                        e
                    ))
                })?
            }
        } else {
            BTreeMap::new()
        };
        debug!(target: "kwest::storage", path = %path.display(), keys = data.len(), "Opened file backend");
        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_out(&self, data: &BTreeMap<String, String>) -> Result<()> {
        let dir = self.path.parent().unwrap_or(Path::new("."));
        std::fs::create_dir_all(dir)?;

        let content = serde_json::to_vec_pretty(data)?;
        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut file = std::fs::File::create(&tmp_path)?;
            file.write_all(&content)?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl KeyValueBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut data = self.data.write();
        let previous = data.insert(key.to_string(), value.to_string());
        if let Err(e) = self.write_out(&data) {
            // Keep memory and disk in agreement
            match previous {
                Some(old) => data.insert(key.to_string(), old),
                None => data.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut data = self.data.write();
        let Some(previous) = data.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.write_out(&data) {
            data.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.data.read().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        {
            let backend = FileBackend::open(&path).unwrap();
            backend.set("Kwest-Journal.global", r#"{"version":"1.0.0"}"#).unwrap();
            backend.set("other", "x").unwrap();
        }

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(
            backend.get("Kwest-Journal.global").unwrap().as_deref(),
            Some(r#"{"version":"1.0.0"}"#)
        );
        assert_eq!(backend.keys().unwrap(), vec!["Kwest-Journal.global", "other"]);
    }

    #[test]
    fn delete_is_persisted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        let backend = FileBackend::open(&path).unwrap();
        backend.set("a", "1").unwrap();
        backend.delete("a").unwrap();
        drop(backend);

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.get("a").unwrap(), None);
    }

    #[test]
    fn missing_and_empty_files_open_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("state.json");
        let backend = FileBackend::open(&path).unwrap();
        assert!(backend.keys().unwrap().is_empty());

        let empty = dir.path().join("empty.json");
        std::fs::write(&empty, "").unwrap();
        assert!(FileBackend::open(&empty).unwrap().keys().unwrap().is_empty());
    }

    #[test]
    fn creates_parent_directories_on_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a").join("b").join("state.json");
        let backend = FileBackend::open(&path).unwrap();
        backend.set("k", "v").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn corrupt_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = FileBackend::open(&path).unwrap_err();
        assert!(matches!(err, Error::Backend(_)));
    }
}
