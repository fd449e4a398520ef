//! Mock fetch-error hub for testing.

use std::sync::{Arc, Mutex, PoisonError};

use crate::error::FetchFailure;
use crate::providers::{FetchErrorHook, FetchErrorHub};

/// Mock fetch-error hub.
///
/// Holds the registered hook and lets tests fire failures through it as
/// the data layer would.
#[derive(Clone, Default)]
pub struct MockFetchHub {
    hook: Arc<Mutex<Option<FetchErrorHook>>>,
}

impl MockFetchHub {
    /// Create a mock hub with no hook registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` once a hook has been registered.
    #[must_use]
    pub fn hook_registered(&self) -> bool {
        self.hook
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Deliver `failure` to the registered hook, if any.
    pub fn fire(&self, failure: &FetchFailure) {
        let hook = self
            .hook
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        if let Some(hook) = hook {
            hook(failure);
        }
    }
}

impl std::fmt::Debug for MockFetchHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockFetchHub")
            .field("hook_registered", &self.hook_registered())
            .finish()
    }
}

impl FetchErrorHub for MockFetchHub {
    fn set_error_hook(&self, hook: FetchErrorHook) {
        *self.hook.lock().unwrap_or_else(PoisonError::into_inner) = Some(hook);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_fire_without_hook_is_harmless() {
        let hub = MockFetchHub::new();

        hub.fire(&FetchFailure::Transport {
            reason: "nope".to_string(),
        });

        assert!(!hub.hook_registered());
    }

    #[test]
    fn test_registering_again_replaces_the_hook() {
        let hub = MockFetchHub::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let count = Arc::clone(&first);
        hub.set_error_hook(Arc::new(move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        }));

        let count = Arc::clone(&second);
        hub.set_error_hook(Arc::new(move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        }));

        hub.fire(&FetchFailure::Transport {
            reason: "nope".to_string(),
        });

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }
}
