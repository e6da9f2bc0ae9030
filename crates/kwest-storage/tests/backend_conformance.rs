//! Conformance tests shared by every KeyValueBackend and CacheStore
//!
//! Each backend must behave like browser local storage: last write wins,
//! deletes are idempotent and enumeration returns exactly the stored keys.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use tempfile::TempDir;

use kwest_core::{CacheStore, KeyValueBackend};
use kwest_storage::testing::{FailingBackend, FaultPlan};
use kwest_storage::{DirCacheStore, FileBackend, MemoryBackend, MemoryCacheStore};

// ============================================================================
// Helper Functions
// ============================================================================

fn check_key_value_backend(backend: &dyn KeyValueBackend) {
    assert!(backend.keys().unwrap().is_empty());
    assert_eq!(backend.get("Kwest-Journal.global").unwrap(), None);

    backend.set("Kwest-Journal.global", "v1").unwrap();
    backend.set("Kwest-Journal.global", "v2").unwrap();
    backend.set("Kwest-Journal.drafts", "d").unwrap();
    backend.set("unrelated", "u").unwrap();
    assert_eq!(backend.get("Kwest-Journal.global").unwrap().as_deref(), Some("v2"));

    let keys: BTreeSet<String> = backend.keys().unwrap().into_iter().collect();
    assert_eq!(
        keys,
        ["Kwest-Journal.drafts", "Kwest-Journal.global", "unrelated"]
            .into_iter()
            .map(String::from)
            .collect()
    );

    backend.delete("Kwest-Journal.drafts").unwrap();
    backend.delete("Kwest-Journal.drafts").unwrap();
    assert_eq!(backend.get("Kwest-Journal.drafts").unwrap(), None);
    assert_eq!(backend.keys().unwrap().len(), 2);

    // Values are opaque text, including JSON with unicode and newlines
    let tricky = "{\"version\":\"1.0.0\",\"note\":\"line\\nbreak ✓\"}";
    backend.set("Kwest-Journal.tricky", tricky).unwrap();
    assert_eq!(backend.get("Kwest-Journal.tricky").unwrap().as_deref(), Some(tricky));
}

fn check_cache_store(caches: &dyn CacheStore) {
    assert!(caches.names().unwrap().is_empty());
    caches.put("static-v1", "/index.html", b"<html>").unwrap();
    caches.put("static-v1", "/app.js", b"js").unwrap();
    caches.put("api", "/me", b"{}").unwrap();

    assert_eq!(caches.names().unwrap(), vec!["api", "static-v1"]);
    assert_eq!(caches.get("static-v1", "/app.js").unwrap(), Some(b"js".to_vec()));
    assert_eq!(caches.get("missing", "/").unwrap(), None);

    assert!(caches.delete("static-v1").unwrap());
    assert_eq!(caches.get("static-v1", "/app.js").unwrap(), None);
    assert_eq!(caches.names().unwrap(), vec!["api"]);
}

// ============================================================================
// Key-Value Backends
// ============================================================================

mod key_value {
    use super::*;

    #[test]
    fn memory_backend_conforms() {
        check_key_value_backend(&MemoryBackend::new());
    }

    #[test]
    fn file_backend_conforms() {
        let dir = TempDir::new().unwrap();
        check_key_value_backend(&FileBackend::open(dir.path().join("state.json")).unwrap());
    }

    #[test]
    fn failing_backend_without_faults_conforms() {
        check_key_value_backend(&FailingBackend::new(MemoryBackend::new(), FaultPlan::none()));
    }

    #[test]
    fn arc_wrapped_backend_conforms() {
        let backend: Arc<dyn KeyValueBackend> = Arc::new(MemoryBackend::new());
        check_key_value_backend(&backend);
    }

    #[test]
    fn file_backend_concurrent_writers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let backend = Arc::new(FileBackend::open(&path).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let b = Arc::clone(&backend);
                thread::spawn(move || {
                    for i in 0..10 {
                        b.set(&format!("ns.t{}-{}", t, i), &i.to_string()).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        drop(backend);
        let reopened = FileBackend::open(&path).unwrap();
        assert_eq!(reopened.keys().unwrap().len(), 40);
    }

    #[test]
    fn failed_file_write_leaves_memory_unchanged() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be makes the rename fail
        let path = dir.path().join("state.json");
        let backend = FileBackend::open(&path).unwrap();
        backend.set("a", "1").unwrap();
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(backend.set("a", "2").is_err());
        assert_eq!(backend.get("a").unwrap().as_deref(), Some("1"));
        assert!(backend.delete("a").is_err());
        assert_eq!(backend.get("a").unwrap().as_deref(), Some("1"));
    }
}

// ============================================================================
// Cache Stores
// ============================================================================

mod caches {
    use super::*;

    #[test]
    fn memory_cache_store_conforms() {
        check_cache_store(&MemoryCacheStore::new());
    }

    #[test]
    fn dir_cache_store_conforms() {
        let dir = TempDir::new().unwrap();
        check_cache_store(&DirCacheStore::new(dir.path().join("caches")));
    }
}
