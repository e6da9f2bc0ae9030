//! Named content caches
//!
//! - `MemoryCacheStore`: caches held in process memory
//! - `DirCacheStore`: one sub-directory per cache under a root directory
//!
//! Cache and entry names may contain any characters (URLs are typical), so
//! `DirCacheStore` hex-encodes them into file names.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use kwest_core::{CacheStore, Result};

type Cache = BTreeMap<String, Vec<u8>>;

/// In-memory cache collection.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    caches: RwLock<BTreeMap<String, Cache>>,
}

impl MemoryCacheStore {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCacheStore {
    fn names(&self) -> Result<Vec<String>> {
        Ok(self.caches.read().keys().cloned().collect())
    }

    fn delete(&self, name: &str) -> Result<bool> {
        Ok(self.caches.write().remove(name).is_some())
    }

    fn put(&self, name: &str, entry: &str, body: &[u8]) -> Result<()> {
        self.caches
            .write()
            .entry(name.to_string())
            .or_default()
            .insert(entry.to_string(), body.to_vec());
        Ok(())
    }

    fn get(&self, name: &str, entry: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .caches
            .read()
            .get(name)
            .and_then(|cache| cache.get(entry))
            .cloned())
    }
}

/// Directory-backed cache collection.
#[derive(Debug, Clone)]
pub struct DirCacheStore {
    root: PathBuf,
}

impl DirCacheStore {
    /// Use `root` as the cache directory. Nothing is created until the first
    /// `put`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn cache_dir(&self, name: &str) -> PathBuf {
        self.root.join(encode_name(name))
    }
}

impl CacheStore for DirCacheStore {
    fn names(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str().and_then(decode_name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete(&self, name: &str) -> Result<bool> {
        let dir = self.cache_dir(name);
        if !dir.exists() {
            return Ok(false);
        }
        std::fs::remove_dir_all(dir)?;
        Ok(true)
    }

    fn put(&self, name: &str, entry: &str, body: &[u8]) -> Result<()> {
        let dir = self.cache_dir(name);
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join(encode_name(entry)), body)?;
        Ok(())
    }

    fn get(&self, name: &str, entry: &str) -> Result<Option<Vec<u8>>> {
        let path = self.cache_dir(name).join(encode_name(entry));
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read(path)?))
    }
}

fn encode_name(name: &str) -> String {
    name.bytes().map(|b| format!("{:02x}", b)).collect()
}

fn decode_name(encoded: &str) -> Option<String> {
    if encoded.len() % 2 != 0 {
        return None;
    }
    let bytes = (0..encoded.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(encoded.get(i..i + 2)?, 16).ok())
        .collect::<Option<Vec<u8>>>()?;
    String::from_utf8(bytes).ok()
}
