//! Mock token store for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::providers::TokenStore;

/// Mock token store.
///
/// Uses in-memory storage for testing. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockTokenStore {
    token: Arc<Mutex<Option<String>>>,
    clear_calls: Arc<AtomicUsize>,
}

impl MockTokenStore {
    /// Create an empty mock token store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock token store holding `token`.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set_token(token);
        store
    }

    /// Store `token`, as the login flow would.
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    /// Number of times `clear_token` was called (for testing).
    #[must_use]
    pub fn clear_calls(&self) -> usize {
        self.clear_calls.load(Ordering::SeqCst)
    }
}

impl TokenStore for MockTokenStore {
    fn token(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn clear_token(&self) {
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_is_idempotent() {
        let store = MockTokenStore::with_token("tok");

        store.clear_token();
        store.clear_token();

        assert!(store.token().is_none());
        assert_eq!(store.clear_calls(), 2);
    }

    #[test]
    fn test_clones_share_state() {
        let store = MockTokenStore::new();
        let handle = store.clone();

        store.set_token("tok");

        assert_eq!(handle.token().as_deref(), Some("tok"));
    }
}
