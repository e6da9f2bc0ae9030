//! Bulk reset utilities
//!
//! Both operations are destructive and meant for explicit, user-triggered
//! resets. Neither takes part in the store's state machine.

use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{error, info};

use kwest_core::{CacheStore, Error, KeyValueBackend, Result, StorageKey};

/// Delete every backend key owned by `namespace`; returns the count.
///
/// Keys outside the namespace are left alone.
///
/// # Errors
///
/// Returns an error if the backend cannot be enumerated or a delete fails.
pub fn clear_all_persisted_state(backend: &dyn KeyValueBackend, namespace: &str) -> Result<usize> {
    info!(target: "kwest::maintenance", namespace, "Clearing State");
    let mut removed = 0;
    for key in backend.keys()? {
        if StorageKey::is_owned_by(&key, namespace) {
            backend.delete(&key)?;
            removed += 1;
        }
    }
    info!(target: "kwest::maintenance", namespace, removed, "Cleared persisted state");
    Ok(removed)
}

/// Delete every named cache; returns the count.
///
/// # Errors
///
/// Returns an error if the caches cannot be enumerated or one cannot be
/// deleted.
pub fn clear_cache(caches: &dyn CacheStore) -> Result<usize> {
    let mut removed = 0;
    for name in caches.names()? {
        if caches.delete(&name)? {
            removed += 1;
        }
    }
    info!(target: "kwest::maintenance", removed, "Cleared caches");
    Ok(removed)
}

/// Handle to a background cache clear. Dropping it detaches the task.
#[derive(Debug)]
pub struct MaintenanceHandle {
    handle: JoinHandle<Result<usize>>,
}

impl MaintenanceHandle {
    /// Wait for the task and return its result.
    ///
    /// # Errors
    ///
    /// Returns the task's error, or a backend error if it panicked.
    pub fn wait(self) -> Result<usize> {
        self.handle
            .join()
            .map_err(|_| Error::backend("cache clear task panicked"))?
    }

    /// True once the task has finished.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Clear every named cache on a background thread.
///
/// # Errors
///
/// Returns an error if the thread cannot be spawned.
pub fn spawn_clear_cache(caches: Arc<dyn CacheStore>) -> Result<MaintenanceHandle> {
    let handle = std::thread::Builder::new()
        .name("kwest-clear-cache".to_string())
        .spawn(move || {
            let result = clear_cache(caches.as_ref());
            if let Err(e) = &result {
                error!(target: "kwest::maintenance", error = %e, "Cache clear failed");
            }
            result
        })?;
    Ok(MaintenanceHandle { handle })
}
