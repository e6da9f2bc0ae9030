//! User-facing notifications
//!
//! Some actions surface a message to the user instead of changing state.
//! The reducer only describes that effect; the store delivers it through a
//! `Notifier` supplied by the embedding application.

use parking_lot::Mutex;
use tracing::info;

/// Sink for user-facing notifications.
pub trait Notifier: Send + Sync {
    /// Show `message` to the user.
    fn notify(&self, message: &str);
}

/// Notifier that writes messages to the `kwest::notify` log target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        info!(target: "kwest::notify", "{}", message);
    }
}

/// Notifier that keeps every message, for tests and headless use.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    /// Number of messages received.
    pub fn count(&self) -> usize {
        self.messages.lock().len()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

impl<F> Notifier for F
where
    F: Fn(&str) + Send + Sync,
{
    fn notify(&self, message: &str) {
        self(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_notifier_keeps_order() {
        let n = RecordingNotifier::new();
        n.notify("a");
        n.notify("b");
        assert_eq!(n.messages(), vec!["a", "b"]);
        assert_eq!(n.count(), 2);
    }

    #[test]
    fn closures_are_notifiers() {
        let seen = Mutex::new(String::new());
        let f = |m: &str| seen.lock().push_str(m);
        f.notify("hi");
        assert_eq!(*seen.lock(), "hi");
    }
}
