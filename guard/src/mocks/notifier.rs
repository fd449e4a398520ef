//! Mock notifier for testing.

use std::sync::{Arc, Mutex, PoisonError};

use crate::providers::{NoticeLevel, Notifier};

/// Mock notifier.
///
/// Captures every notice for assertions.
#[derive(Debug, Clone, Default)]
pub struct MockNotifier {
    notices: Arc<Mutex<Vec<(NoticeLevel, String)>>>,
}

impl MockNotifier {
    /// Create a mock notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notice shown, in order (for testing).
    #[must_use]
    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns `true` if some notice contains `fragment`.
    #[must_use]
    pub fn saw_message(&self, fragment: &str) -> bool {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|(_, message)| message.contains(fragment))
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message.to_string()));
    }
}
