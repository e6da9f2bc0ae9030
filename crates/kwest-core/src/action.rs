//! Action vocabulary
//!
//! Actions are a closed sum type. Each variant has exactly one entry in the
//! `ActionKind` list, which is also the source of the integer codes in
//! `ACTION_TYPES`. Adding an action means adding a variant here, a branch in
//! the reducer and a method on the consumer facade; the compiler flags a
//! missing reducer branch because every match over `Action` is exhaustive.
//!
//! `RawAction` is the untyped `{ "type": <code>, "payload": <any> }` form.
//! Decoding it is where unregistered codes are rejected. Any payload is
//! accepted: a string is the message itself, anything else is shown as its
//! JSON text.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::error::{Error, Result};
use crate::registry::EnumRegistry;

/// Payload-less discriminant of `Action`, in code order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Show a greeting to the user
    HelloWorld,
}

impl ActionKind {
    /// Every kind, in the order codes are assigned.
    pub const ALL: &'static [ActionKind] = &[ActionKind::HelloWorld];

    /// Symbolic name registered in `ACTION_TYPES`.
    pub const fn name(self) -> &'static str {
        match self {
            ActionKind::HelloWorld => "HELLO_WORLD",
        }
    }

    /// Kind for a symbolic name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }

    /// Integer code assigned by `ACTION_TYPES`.
    pub fn code(self) -> i64 {
        ACTION_TYPES
            .value(self.name())
            .unwrap_or_else(|| unreachable!("ActionKind::ALL seeds ACTION_TYPES"))
    }
}

const fn same_name(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

const fn kind_names_distinct(kinds: &[ActionKind]) -> bool {
    let mut i = 0;
    while i < kinds.len() {
        let mut j = i + 1;
        while j < kinds.len() {
            if same_name(kinds[i].name(), kinds[j].name()) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

const _: () = assert!(
    kind_names_distinct(ActionKind::ALL),
    "ActionKind names must be distinct"
);

/// Registry of action codes, starting at 0.
pub static ACTION_TYPES: Lazy<EnumRegistry> = Lazy::new(|| {
    // Names are checked distinct at compile time and codes from 0 cannot overflow
    EnumRegistry::from_names(ActionKind::ALL.iter().map(|k| k.name()))
        .expect("action names are distinct")
});

/// A dispatchable action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Greet the user; the payload is the message shown.
    HelloWorld(String),
}

impl Action {
    /// Discriminant of this action.
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::HelloWorld(_) => ActionKind::HelloWorld,
        }
    }

    /// Integer code of this action.
    pub fn code(&self) -> i64 {
        self.kind().code()
    }

    /// Untyped form of this action.
    pub fn to_raw(&self) -> RawAction {
        let payload = match self {
            Action::HelloWorld(message) => Value::String(message.clone()),
        };
        RawAction {
            code: self.code(),
            payload,
        }
    }
}

/// Untyped action as produced by integer-code dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAction {
    /// Action code from `ACTION_TYPES`
    #[serde(rename = "type")]
    pub code: i64,
    /// Action payload
    #[serde(default)]
    pub payload: Value,
}

impl RawAction {
    /// Raw action with the given code and payload.
    pub fn new(code: i64, payload: Value) -> Self {
        Self { code, payload }
    }
}

impl TryFrom<RawAction> for Action {
    type Error = Error;

    fn try_from(raw: RawAction) -> Result<Self> {
        let Some(name) = ACTION_TYPES.name(raw.code) else {
            error!(target: "kwest::reducer", code = raw.code, "Unknown action type: {}", raw.code);
            return Err(Error::UnknownActionType(raw.code));
        };
        let Some(kind) = ActionKind::from_name(name) else {
            error!(target: "kwest::reducer", code = raw.code, "Unknown action type: {}", raw.code);
            return Err(Error::UnknownActionType(raw.code));
        };

        match kind {
            ActionKind::HelloWorld => Ok(Action::HelloWorld(payload_text(raw.payload))),
        }
    }
}

fn payload_text(payload: Value) -> String {
    match payload {
        Value::String(text) => text,
        other => other.to_string(),
    }
}
