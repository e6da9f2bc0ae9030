//! VersionedState and StorageKey
//!
//! `VersionedState` is an opaque JSON object that always carries a `version`
//! string. On the wire it is a flat object: `{"version": "1.0.0", ...fields}`.
//!
//! `StorageKey` is `namespace + "." + local_key`, which lets several
//! independent stores share one namespace while `clear_all` only touches
//! keys the namespace owns.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default namespace for every storage key
pub const DEFAULT_NAMESPACE: &str = "Kwest-Journal";

/// Default local key when a store is not given one
pub const DEFAULT_LOCAL_KEY: &str = "global";

/// Current schema version of the built-in default state
pub const CURRENT_VERSION: &str = "1.0.0";

/// Name of the mandatory version field
pub const VERSION_FIELD: &str = "version";

/// Application state tagged with a schema version.
///
/// Values are never mutated in place once committed; transitions clone and
/// return a new value (see the reducer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedState {
    /// Schema version; a stored state with a different version is discarded.
    pub version: String,
    /// All other top-level fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl VersionedState {
    /// Empty state at the given version.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field insertion.
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Read a field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// True if `other` is at the same schema version.
    pub fn same_version(&self, other: &VersionedState) -> bool {
        self.version == other.version
    }
}

impl Default for VersionedState {
    fn default() -> Self {
        Self::new(CURRENT_VERSION)
    }
}

/// Namespaced key under which one store's state is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey {
    namespace: String,
    local_key: String,
}

impl StorageKey {
    /// Key for `local_key` within `namespace`.
    pub fn new(namespace: impl Into<String>, local_key: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local_key: local_key.into(),
        }
    }

    /// Key for `local_key` within the default namespace.
    pub fn local(local_key: impl Into<String>) -> Self {
        Self::new(DEFAULT_NAMESPACE, local_key)
    }

    /// The namespace part.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The local key part.
    pub fn local_key(&self) -> &str {
        &self.local_key
    }

    /// Prefix shared by every key owned by `namespace`.
    pub fn prefix(namespace: &str) -> String {
        format!("{}.", namespace)
    }

    /// True if a raw backend key belongs to `namespace`.
    pub fn is_owned_by(raw: &str, namespace: &str) -> bool {
        raw.strip_prefix(namespace)
            .map_or(false, |rest| rest.starts_with('.'))
    }
}

impl Default for StorageKey {
    fn default() -> Self {
        Self::local(DEFAULT_LOCAL_KEY)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.local_key)
    }
}
