//! Reducer: the only path by which state changes
//!
//! A reducer is a pure function `(&state, &action) -> Transition`. It never
//! touches the committed value: it returns a fresh `VersionedState` plus a
//! list of effects that the store carries out after committing.
//!
//! ## Purity Requirement
//!
//! Reducers must not perform I/O or notify the user themselves. Anything
//! user-visible is described as an `Effect` and executed by the store.

use tracing::error;

use kwest_core::{Action, Error, RawAction, Result, VersionedState};

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Show a message to the user
    Notify(String),
}

/// Output of one reducer step.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// The next committed state
    pub state: VersionedState,
    /// Effects to run after the commit, in order
    pub effects: Vec<Effect>,
}

impl Transition {
    /// Transition to `state` with no effects.
    pub fn to(state: VersionedState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }

    /// Append an effect.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// State transition function.
pub trait Reducer: Send + Sync {
    /// Compute the transition for `action` applied to `state`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownActionType` for actions the reducer has no branch for.
    fn reduce(&self, state: &VersionedState, action: &Action) -> Result<Transition>;
}

impl<F> Reducer for F
where
    F: Fn(&VersionedState, &Action) -> Result<Transition> + Send + Sync,
{
    fn reduce(&self, state: &VersionedState, action: &Action) -> Result<Transition> {
        self(state, action)
    }
}

/// The built-in reducer.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultReducer;

impl Reducer for DefaultReducer {
    fn reduce(&self, state: &VersionedState, action: &Action) -> Result<Transition> {
        let next = state.clone();
        match action {
            Action::HelloWorld(message) => {
                Ok(Transition::to(next).with_effect(Effect::Notify(message.clone())))
            }
        }
    }
}

/// Decode `raw` and run it through `reducer`.
///
/// # Errors
///
/// Returns `UnknownActionType` if the code is not registered, or whatever
/// the reducer returns.
pub fn reduce_raw(
    reducer: &dyn Reducer,
    state: &VersionedState,
    raw: RawAction,
) -> Result<Transition> {
    let action = Action::try_from(raw)?;
    reducer.reduce(state, &action).map_err(|e| {
        if let Error::UnknownActionType(code) = e {
            error!(target: "kwest::reducer", code, "Unknown action type: {}", code);
        }
        e
    })
}
