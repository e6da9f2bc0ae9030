//! Consumer facade
//!
//! `Journal` wraps a `StateContext` and exposes one named method per action,
//! so UI code never builds action values by hand. Each method corresponds to
//! exactly one `ActionKind`; `Journal::SUPPORTED` lists them so the
//! registry, reducer and facade can be checked against each other.

use std::sync::Arc;

use kwest_core::{Action, ActionKind, Result, VersionedState};

use crate::store::StateContext;

/// Message sent by `Journal::hello_world`.
pub const HELLO_WORLD_MESSAGE: &str = "Hello World!";

/// Named-action view of a store.
#[derive(Debug, Clone)]
pub struct Journal {
    ctx: StateContext,
}

impl Journal {
    /// Action kinds this facade has a method for.
    pub const SUPPORTED: &'static [ActionKind] = &[ActionKind::HelloWorld];

    /// Facade over `ctx`.
    pub fn new(ctx: &StateContext) -> Self {
        Self { ctx: ctx.clone() }
    }

    /// Greet the user with the standard message.
    ///
    /// # Errors
    ///
    /// As `StateContext::dispatch`.
    pub fn hello_world(&self) -> Result<Arc<VersionedState>> {
        self.ctx
            .dispatch(Action::HelloWorld(HELLO_WORLD_MESSAGE.to_string()))
    }

    /// The committed state.
    pub fn state(&self) -> Arc<VersionedState> {
        self.ctx.state()
    }

    /// The underlying context.
    pub fn context(&self) -> &StateContext {
        &self.ctx
    }
}
