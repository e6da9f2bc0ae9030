//! Persisted reducer store for kwest
//!
//! - Persistence: hydrate / persist / clear for one namespace
//! - Reducer: pure `(state, action) -> Transition`
//! - PersistenceWriter: single-worker FIFO for storage writes
//! - Store / StateContext: the provider and its shared handle
//! - Journal: named-action facade
//! - maintenance: namespace and cache resets
//! - KwestConfig: `kwest.toml`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod facade;
pub mod maintenance;
pub mod persistence;
pub mod reducer;
pub mod store;
pub mod writer;

pub use config::{KwestConfig, CONFIG_FILE_NAME};
pub use facade::{Journal, HELLO_WORLD_MESSAGE};
pub use maintenance::{clear_all_persisted_state, clear_cache, spawn_clear_cache, MaintenanceHandle};
pub use persistence::{Hydrated, HydrationOutcome, Persistence};
pub use reducer::{reduce_raw, DefaultReducer, Effect, Reducer, Transition};
pub use store::{Listener, StateContext, Store, StoreOptions, SubscriptionId};
pub use writer::{PersistenceWriter, WriterStats};
