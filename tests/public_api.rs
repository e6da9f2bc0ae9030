//! End-to-end tests through the top-level `kwest` crate
//!
//! Mirrors how an application embeds the store: open on a file backend,
//! hand contexts to consumers, dispatch, restart, reset.

use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use kwest::{
    clear_all_persisted_state, Action, EnumRegistry, Error, FileBackend, HydrationOutcome,
    Journal, KeyValueBackend, RawAction, RecordingNotifier, Store, StoreOptions, VersionedState,
    ACTION_TYPES,
};

#[test]
fn enum_registry_scenario() {
    let registry = EnumRegistry::new(["HELLO_WORLD"], 0).unwrap();
    assert_eq!(registry.value("HELLO_WORLD"), Some(0));
    assert_eq!(registry.get_key(0).unwrap(), "HELLO_WORLD");
    assert!(matches!(registry.get_key(1), Err(Error::InvalidEnumValue(1))));
    assert_eq!(ACTION_TYPES.keys(), registry.keys());
}

#[test]
fn application_lifecycle() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    let notifier = Arc::new(RecordingNotifier::new());

    {
        let backend = Arc::new(FileBackend::open(&path).unwrap());
        let store = Store::open(
            backend,
            StoreOptions::new()
                .initial_values(VersionedState::default().with_field("entries", json!([])))
                .notifier(notifier.clone()),
        )
        .unwrap();
        assert_eq!(store.hydration(), &HydrationOutcome::Missing);

        let journal = Journal::new(&store.context());
        journal.hello_world().unwrap();
        store
            .dispatch_raw(RawAction::new(0, json!("Hi")))
            .unwrap();
        assert!(store
            .dispatch_raw(RawAction::new(99, serde_json::Value::Null))
            .unwrap_err()
            .is_unknown_action());
        store.flush().unwrap();
    }
    assert_eq!(notifier.messages(), vec!["Hello World!", "Hi"]);

    // Restart
    let backend = Arc::new(FileBackend::open(&path).unwrap());
    let store = Store::open(backend.clone(), StoreOptions::new()).unwrap();
    assert_eq!(store.hydration(), &HydrationOutcome::Restored);
    assert_eq!(store.state().get("entries"), Some(&json!([])));

    store.dispatch(Action::HelloWorld("again".into())).unwrap();
    store.flush().unwrap();
    drop(store);

    // Reset
    backend.set("unrelated", "kept").unwrap();
    assert_eq!(clear_all_persisted_state(backend.as_ref(), "Kwest-Journal").unwrap(), 1);
    assert_eq!(backend.keys().unwrap(), vec!["unrelated"]);
}
