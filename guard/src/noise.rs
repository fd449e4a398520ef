//! Error-noise suppression.
//!
//! A burst of background requests failing the same way would otherwise
//! stack identical toasts. The filter remembers which messages the visitor
//! has already seen and suppresses exact repeats for a while.
//!
//! Suppression is deliberately coarse: one shared sweep timer clears the
//! whole cache in one shot. A message cached shortly before the sweep gets
//! a shorter quiet period than one cached right after it. That trade keeps
//! the filter to a single timer instead of one per message, and an extra
//! toast every few seconds is harmless.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Deduplicates user-facing error messages within a rolling window.
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    window: Duration,
    seen: Arc<Mutex<HashSet<String>>>,
}

impl NoiseFilter {
    /// Create a filter that suppresses repeats for `window`.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            seen: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Returns `true` if `message` should reach the visitor.
    ///
    /// The first sighting of a message is admitted and cached; exact
    /// repeats are suppressed until the shared sweep clears the cache.
    /// Inserting into an empty cache arms the sweep; it fires once, clears
    /// everything, and the next admitted message arms it again.
    ///
    /// Must be called from within a tokio runtime, which is where fetch
    /// error hooks already run.
    pub fn should_surface(&self, message: &str) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);

        if seen.contains(message) {
            return false;
        }

        let arm_sweep = seen.is_empty();
        seen.insert(message.to_string());
        drop(seen);

        if arm_sweep {
            let seen = Arc::clone(&self.seen);
            let window = self.window;

            tokio::spawn(async move {
                tokio::time::sleep(window).await;

                let mut seen = seen.lock().unwrap_or_else(PoisonError::into_inner);
                let cleared = seen.len();
                seen.clear();
                tracing::trace!(cleared, "error noise cache swept");
            });
        }

        true
    }

    /// Number of messages currently cached.
    ///
    /// Exposed for dashboards and tests.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
