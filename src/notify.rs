//! User-notification port.
//!
//! The client reports application-level error messages (`status_message`)
//! through a [`Notifier`] injected at construction time. Rendering the
//! message (modal, toast, log line) belongs to the implementation.

/// Receives plain-text messages meant for the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

impl<F> Notifier for F
where
    F: Fn(&str) + Send + Sync,
{
    fn notify(&self, message: &str) {
        self(message)
    }
}

/// Discards every message.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _message: &str) {}
}

/// Emits every message as a `tracing` warning.
#[cfg(feature = "tracing")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

#[cfg(feature = "tracing")]
impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        tracing::warn!(notification = message, "backend reported an error message");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crate::{Notifier, SilentNotifier};

    #[test]
    fn closure_notifier_receives_message() {
        let seen = Mutex::new(Vec::new());
        let notifier = |message: &str| seen.lock().unwrap().push(message.to_owned());
        notifier.notify("boom");
        SilentNotifier.notify("ignored");
        assert_eq!(*seen.lock().unwrap(), vec!["boom".to_owned()]);
    }
}
