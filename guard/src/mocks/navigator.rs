//! Mock navigator for testing.

use std::sync::{Arc, Mutex, PoisonError};

use crate::providers::{NavigationMode, Navigator};

/// Mock navigator.
///
/// Records every navigation and lets tests script the current path.
/// Navigating also moves the current path, like a real router would.
#[derive(Debug, Clone)]
pub struct MockNavigator {
    current: Arc<Mutex<String>>,
    navigations: Arc<Mutex<Vec<(String, NavigationMode)>>>,
}

impl MockNavigator {
    /// Create a mock navigator sitting on `/`.
    #[must_use]
    pub fn new() -> Self {
        Self::at("/")
    }

    /// Create a mock navigator sitting on `path`.
    #[must_use]
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            current: Arc::new(Mutex::new(path.into())),
            navigations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Move the visitor to `path` without recording a navigation, as a
    /// link click outside the guard would.
    pub fn set_current_path(&self, path: impl Into<String>) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = path.into();
    }

    /// Every navigation issued through the trait, in order (for testing).
    #[must_use]
    pub fn navigations(&self) -> Vec<(String, NavigationMode)> {
        self.navigations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of navigations issued (for testing).
    #[must_use]
    pub fn navigation_count(&self) -> usize {
        self.navigations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for MockNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for MockNavigator {
    fn current_path(&self) -> String {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn navigate(&self, path: &str, mode: NavigationMode) {
        self.navigations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((path.to_string(), mode));
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = path.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigate_records_and_moves() {
        let navigator = MockNavigator::at("/billing");

        navigator.navigate("/login", NavigationMode::Replace);

        assert_eq!(navigator.current_path(), "/login");
        assert_eq!(
            navigator.navigations(),
            vec![("/login".to_string(), NavigationMode::Replace)]
        );
    }

    #[test]
    fn test_set_current_path_records_nothing() {
        let navigator = MockNavigator::new();

        navigator.set_current_path("/pricing");

        assert_eq!(navigator.current_path(), "/pricing");
        assert_eq!(navigator.navigation_count(), 0);
    }
}
