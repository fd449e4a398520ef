//! Collaborator interfaces.
//!
//! This module defines traits for all external surfaces the guard touches:
//! token storage, the router, the toast surface, and the data-fetching
//! layer. These traits enable dependency injection and make the guard
//! logic testable.
//!
//! # Architecture
//!
//! Providers are **interfaces**, not implementations. The guard depends on
//! these traits; the host application provides concrete implementations:
//!
//! - **Testing**: Use mocks (in-memory, deterministic)
//! - **Production**: Use the real router, real storage, real fetch layer
//! - **Development**: Use instrumented versions (logging, tracing)
//!
//! The one concrete implementation shipped here is [`HttpSessionProbe`],
//! because the remote session check is the guard's own concern rather
//! than a host surface.

use serde::{Deserialize, Serialize};

pub mod fetch;
pub mod http;
pub mod navigator;
pub mod notifier;
pub mod token_store;

// Re-export provider traits
pub use fetch::{FetchErrorHook, FetchErrorHub};
pub use http::HttpSessionProbe;
pub use navigator::{NavigationMode, Navigator};
pub use notifier::{NoticeLevel, Notifier};
pub use token_store::TokenStore;

/// Remote answer to "does this visitor currently hold a session".
///
/// The identity service may return more than this; only the boolean is
/// inspected here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    /// Whether the identity service recognizes the presented token.
    pub logged_in: bool,
}
