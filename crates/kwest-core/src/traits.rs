//! Backend traits
//!
//! The persistence adapter only sees string keys and string values, the same
//! surface a browser's local storage offers. Named content caches are a
//! separate facility with their own trait.
//!
//! Thread safety: implementations are shared between the store and its
//! persistence writer thread, so both traits require `Send + Sync`.

use crate::error::Result;

/// Key-value storage backend.
pub trait KeyValueBackend: Send + Sync {
    /// Raw value stored under `key`, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    fn delete(&self, key: &str) -> Result<()>;

    /// Every key currently stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be enumerated.
    fn keys(&self) -> Result<Vec<String>>;
}

/// Collection of named content caches.
pub trait CacheStore: Send + Sync {
    /// Names of all caches.
    ///
    /// # Errors
    ///
    /// Returns an error if the caches cannot be enumerated.
    fn names(&self) -> Result<Vec<String>>;

    /// Delete the cache `name`; returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache exists but cannot be removed.
    fn delete(&self, name: &str) -> Result<bool>;

    /// Store an entry in cache `name`, creating the cache if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be written.
    fn put(&self, name: &str, entry: &str, body: &[u8]) -> Result<()>;

    /// Read an entry from cache `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry exists but cannot be read.
    fn get(&self, name: &str, entry: &str) -> Result<Option<Vec<u8>>>;
}

impl<T: KeyValueBackend + ?Sized> KeyValueBackend for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }
}

impl<T: CacheStore + ?Sized> CacheStore for std::sync::Arc<T> {
    fn names(&self) -> Result<Vec<String>> {
        (**self).names()
    }

    fn delete(&self, name: &str) -> Result<bool> {
        (**self).delete(name)
    }

    fn put(&self, name: &str, entry: &str, body: &[u8]) -> Result<()> {
        (**self).put(name, entry, body)
    }

    fn get(&self, name: &str, entry: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(name, entry)
    }
}
