//! Router surface.

/// How a navigation manipulates the history stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
    /// Append a new history entry.
    Push,

    /// Overwrite the current history entry.
    Replace,
}

/// Imperative routing surface.
///
/// The guard reads `current_path` at decision time rather than capturing
/// the path when a route event fires: a debounced evaluation must judge
/// wherever the visitor actually ended up, not where they passed through.
pub trait Navigator: Send + Sync {
    /// Path of the route the visitor is currently on.
    fn current_path(&self) -> String;

    /// Navigate to `path`.
    ///
    /// Corrective navigations issued by the guard always use
    /// [`NavigationMode::Replace`], so the back button cannot resurrect a
    /// page the visitor was just removed from.
    fn navigate(&self, path: &str, mode: NavigationMode);
}
