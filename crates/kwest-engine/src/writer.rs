//! Ordered persistence writer.
//!
//! A single worker thread drains a FIFO queue of write jobs. Exactly one job
//! runs at a time and jobs run in submission order, so the backend sees
//! committed states in commit order. Nothing is coalesced: every submitted
//! state is written.
//!
//! Callers never wait for a write. Failures are kept (the first one wins)
//! until someone collects them with `take_failure`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::{Condvar, Mutex};
use tracing::error;

use kwest_core::{Error, Result};

type Job = Box<dyn FnOnce() -> Result<()> + Send>;

/// Writer metrics snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterStats {
    /// Jobs waiting in the queue
    pub queued: usize,
    /// Whether a job is running right now
    pub in_flight: bool,
    /// Jobs finished, successfully or not
    pub completed: u64,
    /// Jobs that returned an error
    pub failed: u64,
}

struct Queue {
    jobs: VecDeque<Job>,
    in_flight: bool,
}

struct WriterInner {
    queue: Mutex<Queue>,
    work_ready: Condvar,
    drain_cond: Condvar,
    shutdown: AtomicBool,
    completed: AtomicU64,
    failed: AtomicU64,
    failure: Mutex<Option<Error>>,
}

/// Single-worker FIFO queue for persistence writes.
pub struct PersistenceWriter {
    inner: Arc<WriterInner>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl PersistenceWriter {
    /// Start a writer whose worker thread is called `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread cannot be spawned.
    pub fn start(name: impl Into<String>) -> Result<Self> {
        let inner = Arc::new(WriterInner {
            queue: Mutex::new(Queue {
                jobs: VecDeque::new(),
                in_flight: false,
            }),
            work_ready: Condvar::new(),
            drain_cond: Condvar::new(),
            shutdown: AtomicBool::new(false),
            completed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            failure: Mutex::new(None),
        });

        let worker_inner = Arc::clone(&inner);
        let handle = std::thread::Builder::new()
            .name(name.into())
            .spawn(move || worker_loop(&worker_inner))?;

        Ok(Self {
            inner,
            worker: Mutex::new(Some(handle)),
        })
    }

    /// Queue a write job behind every job submitted before it.
    ///
    /// # Errors
    ///
    /// Returns `StoreClosed` once the writer has been shut down.
    pub fn submit(&self, job: impl FnOnce() -> Result<()> + Send + 'static) -> Result<()> {
        let mut queue = self.inner.queue.lock();
        if self.inner.shutdown.load(AtomicOrdering::Acquire) {
            return Err(Error::StoreClosed);
        }
        queue.jobs.push_back(Box::new(job));
        drop(queue);
        self.inner.work_ready.notify_one();
        Ok(())
    }

    /// Block until every queued and in-flight job has finished.
    pub fn drain(&self) {
        let mut queue = self.inner.queue.lock();
        while !queue.jobs.is_empty() || queue.in_flight {
            self.inner.drain_cond.wait(&mut queue);
        }
    }

    /// Remove and return the recorded write failure, if any.
    pub fn take_failure(&self) -> Option<Error> {
        self.inner.failure.lock().take()
    }

    /// True if a write failure is waiting to be collected.
    pub fn has_failure(&self) -> bool {
        self.inner.failure.lock().is_some()
    }

    /// Stop accepting jobs, finish the queue and join the worker.
    pub fn shutdown(&self) {
        {
            let _queue = self.inner.queue.lock();
            self.inner.shutdown.store(true, AtomicOrdering::Release);
            self.inner.work_ready.notify_all();
        }
        if let Some(handle) = self.worker.lock().take() {
            let _ = handle.join();
        }
    }

    /// Metrics snapshot.
    pub fn stats(&self) -> WriterStats {
        let queue = self.inner.queue.lock();
        WriterStats {
            queued: queue.jobs.len(),
            in_flight: queue.in_flight,
            completed: self.inner.completed.load(AtomicOrdering::Relaxed),
            failed: self.inner.failed.load(AtomicOrdering::Acquire),
        }
    }
}

impl Drop for PersistenceWriter {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for PersistenceWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceWriter")
            .field("stats", &self.stats())
            .finish()
    }
}

/// Clears `in_flight` and wakes drain waiters even if the job panics.
struct InFlightGuard<'a> {
    inner: &'a WriterInner,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.inner.completed.fetch_add(1, AtomicOrdering::Relaxed);
        let mut queue = self.inner.queue.lock();
        queue.in_flight = false;
        if queue.jobs.is_empty() {
            self.inner.drain_cond.notify_all();
        }
    }
}

fn worker_loop(inner: &WriterInner) {
    loop {
        let job = {
            let mut queue = inner.queue.lock();
            loop {
                if let Some(job) = queue.jobs.pop_front() {
                    queue.in_flight = true;
                    break job;
                }
                if inner.shutdown.load(AtomicOrdering::Acquire) {
                    return;
                }
                inner.work_ready.wait(&mut queue);
            }
        };

        let _guard = InFlightGuard { inner };

        let outcome = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(job)) {
            Ok(result) => result,
            Err(e) => Err(Error::backend(format!(
                "persistence job panicked: {}",
                e.downcast_ref::<&str>().copied().unwrap_or("(non-string panic)")
            ))),
        };

        if let Err(e) = outcome {
            error!(target: "kwest::writer", error = %e, "Persistence write failed");
            {
                let mut failure = inner.failure.lock();
                if failure.is_none() {
                    *failure = Some(e);
                }
            }
            inner.failed.fetch_add(1, AtomicOrdering::Release);
        }
    }
}
