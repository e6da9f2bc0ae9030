//! Store provider
//!
//! Wires hydration, the reducer and ordered persistence into one unit.
//!
//! ## Lifecycle
//!
//! 1. `clear_on_init` wipes every key in the namespace
//! 2. the state for `local_key` is hydrated (falling back to
//!    `initial_values`)
//! 3. the hydrated value becomes the committed state and is queued for
//!    persistence, like every later transition
//!
//! ## Sharing
//!
//! `Store::context()` hands out cloneable `StateContext` handles. Every
//! handle reads the same `Arc<VersionedState>` after each transition, and
//! all mutation goes through `dispatch`, one transition at a time.
//!
//! A dispatch holds the store's gate from reduce through publish, so
//! listeners on every thread are told about states in commit order. The gate
//! is re-entrant: a listener or notifier may dispatch on the same thread, in
//! which case the outer publish stops as soon as a newer state is committed.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex, RwLock};
use tracing::{debug, error, info};

use kwest_core::{
    Action, Error, KeyValueBackend, LogNotifier, Notifier, RawAction, Result, StorageKey,
    VersionedState, DEFAULT_LOCAL_KEY, DEFAULT_NAMESPACE,
};

use crate::config::KwestConfig;
use crate::persistence::{HydrationOutcome, Persistence};
use crate::reducer::{DefaultReducer, Effect, Reducer};
use crate::writer::{PersistenceWriter, WriterStats};

/// Callback invoked with each newly committed state.
pub type Listener = Arc<dyn Fn(&Arc<VersionedState>) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Provider configuration.
#[derive(Clone)]
pub struct StoreOptions {
    /// Store selector within the namespace
    pub local_key: String,
    /// State used when nothing valid is persisted
    pub initial_values: VersionedState,
    /// Transition function
    pub reducer: Arc<dyn Reducer>,
    /// Wipe the whole namespace before hydrating
    pub clear_on_init: bool,
    /// Storage namespace
    pub namespace: String,
    /// Receiver of user-facing notifications
    pub notifier: Arc<dyn Notifier>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            local_key: DEFAULT_LOCAL_KEY.to_string(),
            initial_values: VersionedState::default(),
            reducer: Arc::new(DefaultReducer),
            clear_on_init: false,
            namespace: DEFAULT_NAMESPACE.to_string(),
            notifier: Arc::new(LogNotifier),
        }
    }
}

impl fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("local_key", &self.local_key)
            .field("initial_values", &self.initial_values)
            .field("clear_on_init", &self.clear_on_init)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl StoreOptions {
    /// Defaults: key `global`, built-in reducer and default state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options taken from a config file; reducer and notifier stay default.
    pub fn from_config(config: &KwestConfig) -> Self {
        Self {
            local_key: config.local_key.clone(),
            clear_on_init: config.clear_on_init,
            namespace: config.namespace.clone(),
            ..Self::default()
        }
    }

    /// Set the local key.
    pub fn local_key(mut self, local_key: impl Into<String>) -> Self {
        self.local_key = local_key.into();
        self
    }

    /// Set the initial values.
    pub fn initial_values(mut self, initial_values: VersionedState) -> Self {
        self.initial_values = initial_values;
        self
    }

    /// Set the reducer.
    pub fn reducer(mut self, reducer: impl Reducer + 'static) -> Self {
        self.reducer = Arc::new(reducer);
        self
    }

    /// Set whether the namespace is cleared before hydration.
    pub fn clear_on_init(mut self, clear: bool) -> Self {
        self.clear_on_init = clear;
        self
    }

    /// Set the namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the notifier.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }
}

struct StoreInner {
    persistence: Persistence,
    local_key: String,
    reducer: Arc<dyn Reducer>,
    notifier: Arc<dyn Notifier>,
    committed: Mutex<Arc<VersionedState>>,
    /// Bumped on every commit, read by `publish`
    revision: AtomicU64,
    /// Serialises dispatch from reduce through publish
    gate: ReentrantMutex<()>,
    listeners: RwLock<Vec<(SubscriptionId, Listener)>>,
    next_listener: AtomicU64,
    writer: PersistenceWriter,
    hydration: HydrationOutcome,
}

/// Owner of one persisted, reducer-managed state.
pub struct Store {
    ctx: StateContext,
}

impl Store {
    /// Open the store for `options.local_key` on `backend`.
    ///
    /// # Errors
    ///
    /// Returns an error if `clear_on_init` is set and clearing fails, or if
    /// the persistence writer cannot be started. Hydration problems are not
    /// errors; they fall back to `initial_values`.
    pub fn open(backend: Arc<dyn KeyValueBackend>, options: StoreOptions) -> Result<Self> {
        let persistence = Persistence::with_namespace(backend, options.namespace.clone());

        if options.clear_on_init {
            persistence.clear_all()?;
        }

        let hydrated = persistence.hydrate_with_outcome(&options.local_key, &options.initial_values);
        let storage_key = persistence.storage_key(&options.local_key);
        info!(
            target: "kwest::store",
            key = %storage_key,
            outcome = %hydrated.outcome,
            "Opened store"
        );

        let writer = PersistenceWriter::start(format!("kwest-persist-{}", options.local_key))?;
        let inner = Arc::new(StoreInner {
            persistence,
            local_key: options.local_key,
            reducer: options.reducer,
            notifier: options.notifier,
            committed: Mutex::new(Arc::new(hydrated.state)),
            revision: AtomicU64::new(0),
            gate: ReentrantMutex::new(()),
            listeners: RwLock::new(Vec::new()),
            next_listener: AtomicU64::new(0),
            writer,
            hydration: hydrated.outcome,
        });
        let ctx = StateContext { inner };

        // Hydration counts as the first transition
        let initial = ctx.state();
        ctx.enqueue_persist(initial)?;

        Ok(Self { ctx })
    }

    /// Shared handle for consumers.
    pub fn context(&self) -> StateContext {
        self.ctx.clone()
    }

    /// Block until every queued write has reached the backend.
    ///
    /// # Errors
    ///
    /// Returns the first write failure recorded since it was last collected.
    pub fn flush(&self) -> Result<()> {
        self.ctx.inner.writer.drain();
        match self.ctx.inner.writer.take_failure() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// How the initial state was obtained.
    pub fn hydration(&self) -> &HydrationOutcome {
        &self.ctx.inner.hydration
    }

    /// Persistence adapter bound to this store's namespace.
    pub fn persistence(&self) -> &Persistence {
        &self.ctx.inner.persistence
    }

    /// Writer metrics.
    pub fn writer_stats(&self) -> WriterStats {
        self.ctx.inner.writer.stats()
    }
}

impl std::ops::Deref for Store {
    type Target = StateContext;

    fn deref(&self) -> &StateContext {
        &self.ctx
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("key", &self.storage_key())
            .field("hydration", self.hydration())
            .finish()
    }
}

/// Cloneable `{state, dispatch}` handle onto a store.
#[derive(Clone)]
pub struct StateContext {
    inner: Arc<StoreInner>,
}

impl StateContext {
    /// The committed state.
    pub fn state(&self) -> Arc<VersionedState> {
        Arc::clone(&self.inner.committed.lock())
    }

    /// Local key of the store.
    pub fn local_key(&self) -> &str {
        &self.inner.local_key
    }

    /// Full storage key of the store.
    pub fn storage_key(&self) -> StorageKey {
        self.inner.persistence.storage_key(&self.inner.local_key)
    }

    /// Apply `action` and return the new committed state.
    ///
    /// The write to storage is queued, not awaited. Effects run after the
    /// commit, then subscribers are told about the new state. Concurrent
    /// dispatches from other threads wait until this one has published.
    ///
    /// # Errors
    ///
    /// - a write failure from an earlier transition, before anything is
    ///   applied
    /// - whatever the reducer returns (`UnknownActionType` for actions it
    ///   has no branch for); the committed state is left untouched
    pub fn dispatch(&self, action: Action) -> Result<Arc<VersionedState>> {
        let _gate = self.inner.gate.lock();
        if let Some(e) = self.inner.writer.take_failure() {
            return Err(e);
        }

        let (next, revision, effects) = {
            let mut committed = self.inner.committed.lock();
            let transition = self
                .inner
                .reducer
                .reduce(&committed, &action)
                .map_err(|e| {
                    if let Error::UnknownActionType(code) = e {
                        error!(target: "kwest::reducer", code, "Unknown action type: {}", code);
                    }
                    e
                })?;
            let next = Arc::new(transition.state);
            self.enqueue_persist(Arc::clone(&next))?;
            *committed = Arc::clone(&next);
            let revision = self.inner.revision.fetch_add(1, Ordering::AcqRel) + 1;
            (next, revision, transition.effects)
        };
        debug!(target: "kwest::store", key = %self.storage_key(), action = ?action.kind(), "Committed transition");

        for effect in effects {
            match effect {
                Effect::Notify(message) => self.inner.notifier.notify(&message),
            }
        }
        self.publish(&next, revision);
        Ok(next)
    }

    /// Decode an integer-coded action and dispatch it.
    ///
    /// # Errors
    ///
    /// Returns `UnknownActionType` for unregistered codes, otherwise as
    /// `dispatch`.
    pub fn dispatch_raw(&self, raw: RawAction) -> Result<Arc<VersionedState>> {
        let action = Action::try_from(raw)?;
        self.dispatch(action)
    }

    /// Call `listener` with every state committed from now on.
    ///
    /// Listeners run on the dispatching thread after the commit and must not
    /// block for long.
    pub fn subscribe(
        &self,
        listener: impl Fn(&Arc<VersionedState>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_listener.fetch_add(1, Ordering::Relaxed));
        self.inner.listeners.write().push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener; returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.inner.listeners.write();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    fn publish(&self, state: &Arc<VersionedState>, revision: u64) {
        // Snapshot so listeners may (un)subscribe re-entrantly
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .read()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            // A listener dispatched re-entrantly; the newer state was already published
            if self.inner.revision.load(Ordering::Acquire) != revision {
                break;
            }
            listener(state);
        }
    }

    fn enqueue_persist(&self, state: Arc<VersionedState>) -> Result<()> {
        let persistence = self.inner.persistence.clone();
        let local_key = self.inner.local_key.clone();
        self.inner
            .writer
            .submit(move || persistence.persist(&local_key, &state))
    }
}

impl fmt::Debug for StateContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateContext")
            .field("key", &self.storage_key())
            .finish()
    }
}
