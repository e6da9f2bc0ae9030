//! Storage backends for kwest
//!
//! This crate implements the backends the state container is injected with:
//! - MemoryBackend: BTreeMap-based key-value storage with RwLock
//! - FileBackend: key-value storage persisted as one atomically replaced
//!   JSON file
//! - MemoryCacheStore / DirCacheStore: named content caches
//! - testing: fault injection for exercising failure paths

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod file;
pub mod memory;
pub mod testing;

pub use cache::{DirCacheStore, MemoryCacheStore};
pub use file::FileBackend;
pub use memory::MemoryBackend;
