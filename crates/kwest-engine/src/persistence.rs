//! Persistence adapter
//!
//! Owns the stored representation of every store in one namespace.
//!
//! ## Hydration
//!
//! `hydrate` never fails. Any backend read error, unparsable value, missing
//! value or version mismatch degrades to the caller's default state and is
//! logged at `warn`. The stored value is discarded, never merged.
//!
//! ## Persist
//!
//! `persist` serializes the full state and overwrites the key. Errors are
//! returned as `PersistenceWriteFailure`: a lost write is never hidden.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use kwest_core::{
    Error, KeyValueBackend, Result, StorageKey, VersionedState, DEFAULT_NAMESPACE, VERSION_FIELD,
};

use crate::maintenance;

/// Why hydration did or did not use the stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydrationOutcome {
    /// The stored value was valid and is now the state
    Restored,
    /// Nothing was stored under the key
    Missing,
    /// The backend read failed
    ReadFailed(String),
    /// The stored text was not valid JSON
    Corrupt(String),
    /// The stored value's version did not match the default's
    VersionMismatch {
        /// Version found in storage, if it had one
        stored: Option<String>,
        /// Version of the default state
        expected: String,
    },
}

impl HydrationOutcome {
    /// True when the default state was used instead of the stored one.
    pub fn fell_back(&self) -> bool {
        !matches!(self, HydrationOutcome::Restored)
    }
}

impl fmt::Display for HydrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HydrationOutcome::Restored => write!(f, "restored"),
            HydrationOutcome::Missing => write!(f, "no stored state"),
            HydrationOutcome::ReadFailed(e) => write!(f, "read failed: {}", e),
            HydrationOutcome::Corrupt(e) => write!(f, "corrupt: {}", e),
            HydrationOutcome::VersionMismatch { stored, expected } => write!(
                f,
                "version mismatch: stored {}, expected {}",
                stored.as_deref().unwrap_or("<none>"),
                expected
            ),
        }
    }
}

/// Result of hydration: the state to use plus how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct Hydrated {
    /// State to seed the store with
    pub state: VersionedState,
    /// How `state` was obtained
    pub outcome: HydrationOutcome,
}

/// Namespaced access to a key-value backend.
#[derive(Clone)]
pub struct Persistence {
    backend: Arc<dyn KeyValueBackend>,
    namespace: String,
}

impl fmt::Debug for Persistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Persistence")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl Persistence {
    /// Persistence in the default namespace.
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self::with_namespace(backend, DEFAULT_NAMESPACE)
    }

    /// Persistence in `namespace`.
    pub fn with_namespace(backend: Arc<dyn KeyValueBackend>, namespace: impl Into<String>) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
        }
    }

    /// Namespace owned by this adapter.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Underlying backend.
    pub fn backend(&self) -> &Arc<dyn KeyValueBackend> {
        &self.backend
    }

    /// Storage key for `local_key`.
    pub fn storage_key(&self, local_key: &str) -> StorageKey {
        StorageKey::new(self.namespace.clone(), local_key)
    }

    /// Load the state for `local_key`, falling back to `default`.
    pub fn hydrate(&self, local_key: &str, default: &VersionedState) -> VersionedState {
        self.hydrate_with_outcome(local_key, default).state
    }

    /// Load the state for `local_key` and report how it was obtained.
    pub fn hydrate_with_outcome(&self, local_key: &str, default: &VersionedState) -> Hydrated {
        let key = self.storage_key(local_key);
        match self.read_stored(&key, default) {
            Ok(state) => {
                debug!(target: "kwest::persistence", key = %key, "Hydrated persisted state");
                Hydrated {
                    state,
                    outcome: HydrationOutcome::Restored,
                }
            }
            Err(outcome) => {
                match &outcome {
                    HydrationOutcome::VersionMismatch { stored, expected } => warn!(
                        target: "kwest::persistence",
                        key = %key,
                        stored = stored.as_deref().unwrap_or("<none>"),
                        expected = %expected,
                        "State version mismatch, returning initial state..."
                    ),
                    other => warn!(
                        target: "kwest::persistence",
                        key = %key,
                        reason = %other,
                        "Failed to read current state version, returning initial state..."
                    ),
                }
                Hydrated {
                    state: default.clone(),
                    outcome,
                }
            }
        }
    }

    fn read_stored(
        &self,
        key: &StorageKey,
        default: &VersionedState,
    ) -> std::result::Result<VersionedState, HydrationOutcome> {
        let raw = self
            .backend
            .get(&key.to_string())
            .map_err(|e| HydrationOutcome::ReadFailed(e.to_string()))?
            .ok_or(HydrationOutcome::Missing)?;

        let parsed: Value =
            serde_json::from_str(&raw).map_err(|e| HydrationOutcome::Corrupt(e.to_string()))?;
        if parsed.is_null() {
            return Err(HydrationOutcome::Missing);
        }

        let stored_version = parsed
            .get(VERSION_FIELD)
            .and_then(Value::as_str)
            .map(str::to_string);
        if stored_version.as_deref() != Some(default.version.as_str()) {
            return Err(HydrationOutcome::VersionMismatch {
                stored: stored_version,
                expected: default.version.clone(),
            });
        }

        serde_json::from_value(parsed).map_err(|e| HydrationOutcome::Corrupt(e.to_string()))
    }

    /// Write `state` under `local_key`.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceWriteFailure` if serialization or the backend
    /// write fails.
    pub fn persist(&self, local_key: &str, state: &VersionedState) -> Result<()> {
        let key = self.storage_key(local_key).to_string();
        let content = serde_json::to_string(state).map_err(|e| Error::PersistenceWriteFailure {
            key: key.clone(),
            reason: e.to_string(),
        })?;
        self.backend
            .set(&key, &content)
            .map_err(|e| Error::PersistenceWriteFailure {
                key: key.clone(),
                reason: e.to_string(),
            })?;
        debug!(target: "kwest::persistence", key = %key, bytes = content.len(), "Persisted state");
        Ok(())
    }

    /// Delete every key in this namespace; returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be enumerated or a delete fails.
    pub fn clear_all(&self) -> Result<usize> {
        maintenance::clear_all_persisted_state(self.backend.as_ref(), &self.namespace)
    }

    /// Local keys of every store persisted in this namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be enumerated.
    pub fn local_keys(&self) -> Result<Vec<String>> {
        let prefix = StorageKey::prefix(&self.namespace);
        Ok(self
            .backend
            .keys()?
            .into_iter()
            .filter_map(|k| k.strip_prefix(&prefix).map(str::to_string))
            .collect())
    }
}
