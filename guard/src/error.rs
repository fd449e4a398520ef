//! Error types for the session guard.

use thiserror::Error;

/// Result type alias for guard operations.
pub type Result<T> = std::result::Result<T, GuardError>;

/// Errors raised by the guard itself.
///
/// These indicate wiring or configuration mistakes in the host application.
/// Failures coming back from the data-fetching layer are not `GuardError`s;
/// they travel as [`FetchFailure`] and are normalized away internally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GuardError {
    // ═══════════════════════════════════════════════════════════
    // Setup Errors
    // ═══════════════════════════════════════════════════════════

    /// `validate()` was called before a session probe was registered.
    #[error("session probe not registered; call register_probe before validate")]
    ProbeNotRegistered,

    /// A path handed to the route table is malformed.
    #[error("invalid route pattern: {pattern:?} (paths must start with '/')")]
    InvalidRoutePattern {
        /// The rejected pattern.
        pattern: String,
    },
}

impl GuardError {
    /// Returns `true` if this error is a wiring mistake that should be
    /// fixed in code rather than handled at runtime.
    ///
    /// # Examples
    ///
    /// ```
    /// # use portal_guard::GuardError;
    /// assert!(GuardError::ProbeNotRegistered.is_setup_error());
    /// ```
    pub const fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Self::ProbeNotRegistered | Self::InvalidRoutePattern { .. }
        )
    }
}

/// A failed data-layer request, as seen by the guard.
///
/// Two shapes matter here: the server answered with a non-success status
/// (`Status`), or the request never completed at all (`Transport`). The
/// distinction drives every downstream decision: retry eligibility, expiry
/// handling, and whether the visitor hears about it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    // ═══════════════════════════════════════════════════════════
    // Transport Failures
    // ═══════════════════════════════════════════════════════════

    /// The request produced no response: DNS failure, refused connection,
    /// timeout, dropped socket.
    #[error("transport failure: {reason}")]
    Transport {
        /// Driver-level description of what went wrong.
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Status Failures
    // ═══════════════════════════════════════════════════════════

    /// The server answered with a non-success status.
    #[error("request failed with status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-provided or synthesized message.
        message: String,
    },
}

impl FetchFailure {
    /// Returns `true` if retrying the request could plausibly succeed.
    ///
    /// Only transport failures qualify. A server that already answered
    /// will give the same answer again; status failures are terminal no
    /// matter the code.
    ///
    /// # Examples
    ///
    /// ```
    /// # use portal_guard::FetchFailure;
    /// let timeout = FetchFailure::Transport { reason: "connect timeout".into() };
    /// assert!(timeout.is_retryable());
    ///
    /// let denied = FetchFailure::Status { status: 500, message: "oops".into() };
    /// assert!(!denied.is_retryable());
    /// ```
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Returns `true` if the server rejected the session itself.
    ///
    /// # Examples
    ///
    /// ```
    /// # use portal_guard::FetchFailure;
    /// let expired = FetchFailure::Status { status: 401, message: "unauthorized".into() };
    /// assert!(expired.is_auth_failure());
    ///
    /// let timeout = FetchFailure::Transport { reason: "connect timeout".into() };
    /// assert!(!timeout.is_auth_failure());
    /// ```
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }

    /// Status code carried by this failure, if the server answered.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } => None,
        }
    }
}
