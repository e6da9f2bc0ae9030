//! kwest - versioned application state that survives restarts
//!
//! One store holds one `VersionedState` under `<namespace>.<local_key>`.
//! State is hydrated from a key-value backend on open, changed only by
//! dispatching actions through a reducer, and written back after every
//! transition.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use kwest::{Journal, MemoryBackend, Store, StoreOptions};
//!
//! let store = Store::open(Arc::new(MemoryBackend::new()), StoreOptions::new())?;
//! let journal = Journal::new(&store.context());
//! journal.hello_world()?;
//! store.flush()?;
//! # Ok::<(), kwest::Error>(())
//! ```
//!
//! # Architecture
//!
//! - `kwest-core`: errors, actions, the enum registry and backend traits
//! - `kwest-storage`: memory, file and cache backends
//! - `kwest-engine`: persistence, reducer, store and maintenance

pub use kwest_core::*;
pub use kwest_engine::*;
pub use kwest_storage::{testing, DirCacheStore, FileBackend, MemoryBackend, MemoryCacheStore};
