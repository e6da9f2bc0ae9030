//! Fault-injecting backend wrapper
//!
//! Wraps any `KeyValueBackend` and fails, delays or records operations
//! according to a `FaultPlan` that can be changed while the backend is in
//! use.

use std::time::Duration;

use parking_lot::{Mutex, RwLock};

use kwest_core::{Error, KeyValueBackend, Result};

/// Which operations should fail or stall.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaultPlan {
    /// `get` returns an error
    pub fail_reads: bool,
    /// `set` and `delete` return an error
    pub fail_writes: bool,
    /// `keys` returns an error
    pub fail_enumeration: bool,
    /// Sleep before every `set`
    pub write_delay: Option<Duration>,
}

impl FaultPlan {
    /// No faults.
    pub fn none() -> Self {
        Self::default()
    }

    /// Every read fails.
    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    /// Every write fails.
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Every write is delayed by `delay`.
    pub fn slow_writes(delay: Duration) -> Self {
        Self {
            write_delay: Some(delay),
            ..Self::default()
        }
    }
}

/// Backend wrapper that injects faults and keeps a log of successful writes.
#[derive(Debug)]
pub struct FailingBackend<B> {
    inner: B,
    plan: RwLock<FaultPlan>,
    writes: Mutex<Vec<(String, String)>>,
}

impl<B: KeyValueBackend> FailingBackend<B> {
    /// Wrap `inner` with the given plan.
    pub fn new(inner: B, plan: FaultPlan) -> Self {
        Self {
            inner,
            plan: RwLock::new(plan),
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Replace the active plan.
    pub fn set_plan(&self, plan: FaultPlan) {
        *self.plan.write() = plan;
    }

    /// The wrapped backend.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Successful `set` calls, in the order they completed.
    pub fn write_log(&self) -> Vec<(String, String)> {
        self.writes.lock().clone()
    }
}

impl<B: KeyValueBackend> KeyValueBackend for FailingBackend<B> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        if self.plan.read().fail_reads {
            return Err(Error::backend(format!("injected read failure for '{}'", key)));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let plan = self.plan.read().clone();
        if let Some(delay) = plan.write_delay {
            std::thread::sleep(delay);
        }
        if plan.fail_writes {
            return Err(Error::backend(format!("injected write failure for '{}'", key)));
        }
        self.inner.set(key, value)?;
        self.writes.lock().push((key.to_string(), value.to_string()));
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        if self.plan.read().fail_writes {
            return Err(Error::backend(format!("injected delete failure for '{}'", key)));
        }
        self.inner.delete(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        if self.plan.read().fail_enumeration {
            return Err(Error::backend("injected enumeration failure"));
        }
        self.inner.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBackend;

    #[test]
    fn passes_through_without_faults() {
        let backend = FailingBackend::new(MemoryBackend::new(), FaultPlan::none());
        backend.set("a", "1").unwrap();
        assert_eq!(backend.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(backend.write_log(), vec![("a".to_string(), "1".to_string())]);
    }

    #[test]
    fn plan_can_change_at_runtime() {
        let backend = FailingBackend::new(MemoryBackend::new(), FaultPlan::failing_writes());
        assert!(backend.set("a", "1").is_err());
        assert!(backend.write_log().is_empty());

        backend.set_plan(FaultPlan::failing_reads());
        backend.set("a", "1").unwrap();
        assert!(backend.get("a").is_err());
        assert_eq!(backend.inner().get("a").unwrap().as_deref(), Some("1"));
    }
}
