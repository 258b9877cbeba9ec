//! Change notification registry.
//!
//! Callbacks run synchronously on the detection task, in the order they
//! were registered. Every callback runs even when an earlier one fails;
//! all failures are collected into a single [`CallbackError`].

use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::{CallbackError, CallbackFailure};

/// Callback invoked when a tracked capability changes.
pub type ChangeCallback = Arc<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// Ordered set of change callbacks.
#[derive(Default)]
pub struct ChangeNotifier {
    callbacks: Mutex<Vec<ChangeCallback>>,
}

impl ChangeNotifier {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a callback. Safe to call while detection is running; the
    /// callback takes part from the next notification round on.
    pub fn register<F>(&self, callback: F)
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let mut callbacks = self.callbacks.lock().expect("callbacks lock");
        callbacks.push(Arc::new(callback));
        debug!(registered = callbacks.len(), "change callback registered");
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.callbacks.lock().expect("callbacks lock").len()
    }

    /// Whether no callback is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every callback in registration order.
    pub fn invoke(&self) -> Result<(), CallbackError> {
        // Snapshot so callbacks run without the registry lock held.
        let callbacks: Vec<ChangeCallback> =
            self.callbacks.lock().expect("callbacks lock").clone();

        let failures: Vec<CallbackFailure> = callbacks
            .iter()
            .enumerate()
            .filter_map(|(index, callback)| {
                callback()
                    .err()
                    .map(|error| CallbackFailure { index, error })
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(CallbackError {
                failures,
                total: callbacks.len(),
            })
        }
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("callbacks", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> ChangeCallback) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let calls_for_make = Arc::clone(&calls);
        let make = move |name: &'static str| -> ChangeCallback {
            let calls = Arc::clone(&calls_for_make);
            Arc::new(move || -> anyhow::Result<()> {
                calls.lock().unwrap().push(name);
                Ok(())
            })
        };
        (calls, make)
    }

    #[test]
    fn invoke_with_no_callbacks_succeeds() {
        let notifier = ChangeNotifier::new();
        assert!(notifier.is_empty());
        assert!(notifier.invoke().is_ok());
    }

    #[test]
    fn callbacks_run_in_registration_order() {
        let notifier = ChangeNotifier::new();
        let (calls, make) = recorder();
        for name in ["first", "second", "third"] {
            let cb = make(name);
            notifier.register(move || cb());
        }

        notifier.invoke().unwrap();
        assert_eq!(*calls.lock().unwrap(), vec!["first", "second", "third"]);
        assert_eq!(notifier.len(), 3);
    }

    #[test]
    fn failing_callback_does_not_stop_later_ones() {
        let notifier = ChangeNotifier::new();
        let (calls, make) = recorder();

        let first = make("first");
        notifier.register(move || first());
        notifier.register(|| anyhow::bail!("boom"));
        let third = make("third");
        notifier.register(move || third());

        let err = notifier.invoke().unwrap_err();
        assert_eq!(*calls.lock().unwrap(), vec!["first", "third"]);
        assert_eq!(err.failures.len(), 1);
        assert_eq!(err.failures[0].index, 1);
        assert_eq!(err.total, 3);
    }

    #[test]
    fn all_failures_are_aggregated_in_order() {
        let notifier = ChangeNotifier::new();
        notifier.register(|| anyhow::bail!("first failure"));
        notifier.register(|| Ok(()));
        notifier.register(|| anyhow::bail!("second failure"));

        let err = notifier.invoke().unwrap_err();
        let indices: Vec<usize> = err.failures.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(err.first().unwrap().error.to_string(), "first failure");
        assert!(err.to_string().starts_with("2 of 3 change callbacks failed"));
    }

    #[test]
    fn callback_may_register_another_callback() {
        let notifier = Arc::new(ChangeNotifier::new());
        let inner = Arc::clone(&notifier);
        notifier.register(move || {
            inner.register(|| Ok(()));
            Ok(())
        });

        notifier.invoke().unwrap();
        assert_eq!(notifier.len(), 2);
    }
}
