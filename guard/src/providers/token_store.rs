//! Session token storage.
//!
//! The token itself is opaque to the guard: it only ever asks whether one
//! is present and clears it when the session turns out to be dead.

/// Persistent storage for the opaque session token.
///
/// Writing the token at login time happens elsewhere in the host
/// application; the guard only reads and clears.
///
/// # Implementation Notes
///
/// - Reads happen on every guard decision, so they must be cheap and
///   synchronous (browser local storage, a keychain entry, an in-memory
///   cell).
/// - **CRITICAL**: `clear_token` must be idempotent. The validator and the
///   expiry interceptor both clear without coordinating, and either may
///   run against an already-empty store.
pub trait TokenStore: Send + Sync {
    /// The stored session token, if any.
    fn token(&self) -> Option<String>;

    /// Returns `true` if a token is currently stored.
    fn has_token(&self) -> bool {
        self.token().is_some()
    }

    /// Remove the stored token.
    ///
    /// Clearing an empty store is a no-op, never an error.
    fn clear_token(&self);
}
