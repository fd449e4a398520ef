//! Data-fetching layer integration.
//!
//! The reactive fetch layer owns request lifecycles, caching, and retry
//! scheduling. The guard plugs into exactly one seam: the global hook the
//! layer invokes with every failed request outcome.

use std::sync::Arc;

use crate::error::FetchFailure;

/// Shared handle to a fetch-error callback.
///
/// The hook is invoked from whatever task the failing request completed
/// on, so it must be `Send + Sync` and must not block.
pub type FetchErrorHook = Arc<dyn Fn(&FetchFailure) + Send + Sync>;

/// Registration point for the data layer's single global error hook.
///
/// One hook per application. Registering again replaces the previous
/// hook, which keeps re-mounting during development harmless.
pub trait FetchErrorHub: Send + Sync {
    /// Register `hook` to be invoked with every failed request outcome.
    fn set_error_hook(&self, hook: FetchErrorHook);
}
