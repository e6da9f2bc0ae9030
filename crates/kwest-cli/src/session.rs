//! One CLI invocation against a data directory.
//!
//! Each command opens what it needs, does its work and flushes before
//! returning, so the process can exit right after.

use std::path::PathBuf;
use std::sync::Arc;

use kwest_core::{Action, Notifier, RawAction, Result};
use kwest_engine::{
    clear_all_persisted_state, clear_cache, KwestConfig, Persistence, Store, StoreOptions,
};

/// Prints notifications to stdout.
struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notify(&self, message: &str) {
        println!("{}", message);
    }
}

/// Data directory, config and selected store.
pub struct Session {
    dir: PathBuf,
    config: KwestConfig,
    local_key: String,
}

impl Session {
    pub fn new(dir: PathBuf, config: KwestConfig, local_key: String) -> Self {
        Self {
            dir,
            config,
            local_key,
        }
    }

    fn open_store(&self) -> Result<Store> {
        let backend = self.config.open_backend(&self.dir)?;
        let options = StoreOptions::from_config(&self.config)
            .local_key(self.local_key.clone())
            .notifier(Arc::new(StdoutNotifier));
        Store::open(Arc::new(backend), options)
    }

    pub fn show(&self) -> Result<()> {
        let store = self.open_store()?;
        println!("{}", serde_json::to_string_pretty(&*store.state())?);
        store.flush()
    }

    pub fn hello(&self, message: String) -> Result<()> {
        let store = self.open_store()?;
        store.dispatch(Action::HelloWorld(message))?;
        store.flush()
    }

    pub fn dispatch(&self, raw: RawAction) -> Result<()> {
        let store = self.open_store()?;
        let state = store.dispatch_raw(raw)?;
        store.flush()?;
        println!("{}", serde_json::to_string(&*state)?);
        Ok(())
    }

    pub fn keys(&self) -> Result<()> {
        let backend = self.config.open_backend(&self.dir)?;
        let persistence =
            Persistence::with_namespace(Arc::new(backend), self.config.namespace.clone());
        for key in persistence.local_keys()? {
            println!("{}", key);
        }
        Ok(())
    }

    pub fn clear_state(&self) -> Result<()> {
        let backend = self.config.open_backend(&self.dir)?;
        let removed = clear_all_persisted_state(&backend, &self.config.namespace)?;
        println!("removed {} key(s)", removed);
        Ok(())
    }

    pub fn clear_cache(&self) -> Result<()> {
        let caches = self.config.cache_store(&self.dir);
        let removed = clear_cache(&caches)?;
        println!("removed {} cache(s)", removed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kwest_core::{CacheStore, KeyValueBackend};
    use serde_json::json;
    use tempfile::TempDir;

    fn session(dir: &TempDir, key: &str) -> Session {
        Session::new(dir.path().to_path_buf(), KwestConfig::default(), key.to_string())
    }

    #[test]
    fn show_persists_the_default_state() {
        let dir = TempDir::new().unwrap();
        session(&dir, "global").show().unwrap();

        let backend = KwestConfig::default().open_backend(dir.path()).unwrap();
        assert_eq!(
            backend.get("Kwest-Journal.global").unwrap().as_deref(),
            Some(r#"{"version":"1.0.0"}"#)
        );
    }

    #[test]
    fn unknown_code_is_reported() {
        let dir = TempDir::new().unwrap();
        let err = session(&dir, "global")
            .dispatch(RawAction::new(99, json!(null)))
            .unwrap_err();
        assert!(err.is_unknown_action());
        assert!(err.to_string().contains("99"));
    }

    #[test]
    fn dispatch_hello_without_payload() {
        let dir = TempDir::new().unwrap();
        session(&dir, "global")
            .dispatch(RawAction::new(0, json!(null)))
            .unwrap();
    }

    #[test]
    fn clear_state_then_keys() {
        let dir = TempDir::new().unwrap();
        session(&dir, "a").show().unwrap();
        session(&dir, "b").show().unwrap();
        session(&dir, "a").clear_state().unwrap();

        let backend = KwestConfig::default().open_backend(dir.path()).unwrap();
        assert!(backend.keys().unwrap().is_empty());
    }

    #[test]
    fn clear_cache_empties_the_cache_dir() {
        let dir = TempDir::new().unwrap();
        let caches = KwestConfig::default().cache_store(dir.path());
        caches.put("v1", "/", b"x").unwrap();
        session(&dir, "global").clear_cache().unwrap();
        assert!(caches.names().unwrap().is_empty());
    }
}
