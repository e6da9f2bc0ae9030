//! Core types and traits for kwest
//!
//! This crate defines the foundational types used throughout the system:
//! - Error: Error type hierarchy
//! - EnumRegistry: frozen bidirectional name <-> code mapping
//! - VersionedState / StorageKey: the persisted value and where it lives
//! - Action / RawAction / ActionKind: the action vocabulary
//! - Notifier: sink for user-facing notifications
//! - Traits: KeyValueBackend, CacheStore

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod action;
pub mod error;
pub mod notify;
pub mod registry;
pub mod state;
pub mod traits;

pub use action::{Action, ActionKind, RawAction, ACTION_TYPES};
pub use error::{Error, Result};
pub use notify::{LogNotifier, Notifier, RecordingNotifier};
pub use registry::EnumRegistry;
pub use state::{
    StorageKey, VersionedState, CURRENT_VERSION, DEFAULT_LOCAL_KEY, DEFAULT_NAMESPACE,
    VERSION_FIELD,
};
pub use traits::{CacheStore, KeyValueBackend};
