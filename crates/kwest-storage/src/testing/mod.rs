//! Testing utilities for backends
//!
//! - **FailingBackend**: wraps a backend and injects read/write/enumeration
//!   failures or write latency according to a `FaultPlan`
//!
//! # Example
//!
//! ```
//! use kwest_core::KeyValueBackend;
//! use kwest_storage::testing::{FailingBackend, FaultPlan};
//! use kwest_storage::MemoryBackend;
//!
//! let backend = FailingBackend::new(MemoryBackend::new(), FaultPlan::failing_writes());
//! assert!(backend.set("k", "v").is_err());
//! ```

mod failing;

pub use failing::{FailingBackend, FaultPlan};
