//! User-facing notification surface.

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational.
    Info,

    /// Something the visitor should act on.
    Warning,

    /// A failed operation.
    Error,
}

/// Toast-style notification surface.
///
/// Rendering, stacking, and dismissal are host concerns. The guard only
/// decides *whether* a message reaches this trait; deduplication of
/// repeated errors happens before the call, not behind it.
pub trait Notifier: Send + Sync {
    /// Show `message` to the visitor.
    fn notify(&self, level: NoticeLevel, message: &str);
}
