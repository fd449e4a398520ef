//! Guard configuration.
//!
//! Timing windows and well-known paths used across the guard. Values
//! should be provided by the application, not hardcoded at call sites.

use std::time::Duration;

/// Session guard configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    /// How long a route change must remain current before it is evaluated.
    ///
    /// Default: 100ms
    pub debounce_window: Duration,

    /// How long one expiry episode suppresses further expiry handling.
    ///
    /// Default: 5 seconds
    pub expiry_reset_window: Duration,

    /// How long a surfaced error message suppresses exact repeats.
    ///
    /// Default: 3 seconds
    pub noise_window: Duration,

    /// Where visitors without a valid session are sent.
    ///
    /// Default: "/login"
    pub login_path: String,

    /// Where already-authenticated visitors land when they open a login page.
    ///
    /// Default: "/dashboard"
    pub home_path: String,

    /// Notice shown when the server reports the session has expired.
    pub expiry_notice: String,
}

impl GuardConfig {
    /// Create a configuration with default windows and paths.
    #[must_use]
    pub fn new() -> Self {
        Self {
            debounce_window: Duration::from_millis(100),
            expiry_reset_window: Duration::from_secs(5),
            noise_window: Duration::from_secs(3),
            login_path: "/login".to_string(),
            home_path: "/dashboard".to_string(),
            expiry_notice: "Your session has expired, please sign in again".to_string(),
        }
    }

    /// Set the debounce window for route evaluation.
    #[must_use]
    pub const fn with_debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    /// Set the expiry re-entrancy window.
    #[must_use]
    pub const fn with_expiry_reset_window(mut self, window: Duration) -> Self {
        self.expiry_reset_window = window;
        self
    }

    /// Set the error-noise suppression window.
    #[must_use]
    pub const fn with_noise_window(mut self, window: Duration) -> Self {
        self.noise_window = window;
        self
    }

    /// Set the login path.
    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Set the home path.
    #[must_use]
    pub fn with_home_path(mut self, path: impl Into<String>) -> Self {
        self.home_path = path.into();
        self
    }

    /// Set the session-expired notice text.
    #[must_use]
    pub fn with_expiry_notice(mut self, notice: impl Into<String>) -> Self {
        self.expiry_notice = notice.into();
        self
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self::new()
    }
}
