//! Session-expiry interception.
//!
//! Protected pages keep several background requests in flight; when a
//! session dies server-side, all of them fail with an authorization error
//! at once. The interceptor hooks the data layer's global error callback
//! and turns that burst into exactly one sign-out: one token clear, one
//! notice, one replace-navigation to the login page.
//!
//! Non-authorization failures take the quiet path: transport errors are
//! left to the data layer's own retry machinery, and other status errors
//! are deduplicated through the [`NoiseFilter`] before they reach the
//! visitor.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use uuid::Uuid;

use crate::config::GuardConfig;
use crate::error::FetchFailure;
use crate::noise::NoiseFilter;
use crate::providers::{FetchErrorHub, NavigationMode, Navigator, NoticeLevel, Notifier, TokenStore};

/// Global fetch-error hook with one-shot expiry handling.
///
/// Construct once at the application root, inside routing context: the
/// corrective navigation goes through the [`Navigator`], not a page
/// reload, so in-memory state survives the trip to the login page.
pub struct ExpiryInterceptor<S, N, T> {
    config: Arc<GuardConfig>,
    token_store: Arc<S>,
    navigator: Arc<N>,
    notifier: Arc<T>,
    handling_expiry: Arc<AtomicBool>,
    noise: NoiseFilter,
    // Metrics
    expiry_episodes: Arc<AtomicU64>,
    coalesced_reentries: Arc<AtomicU64>,
}

impl<S, N, T> Clone for ExpiryInterceptor<S, N, T> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            token_store: Arc::clone(&self.token_store),
            navigator: Arc::clone(&self.navigator),
            notifier: Arc::clone(&self.notifier),
            handling_expiry: Arc::clone(&self.handling_expiry),
            noise: self.noise.clone(),
            expiry_episodes: Arc::clone(&self.expiry_episodes),
            coalesced_reentries: Arc::clone(&self.coalesced_reentries),
        }
    }
}

impl<S, N, T> std::fmt::Debug for ExpiryInterceptor<S, N, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiryInterceptor")
            .field("handling_expiry", &self.handling_expiry.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl<S, N, T> ExpiryInterceptor<S, N, T>
where
    S: TokenStore + 'static,
    N: Navigator + 'static,
    T: Notifier + 'static,
{
    /// Create an interceptor. Nothing happens until
    /// [`install`](Self::install) registers it with the fetch layer.
    #[must_use]
    pub fn new(
        config: Arc<GuardConfig>,
        token_store: Arc<S>,
        navigator: Arc<N>,
        notifier: Arc<T>,
    ) -> Self {
        let noise = NoiseFilter::new(config.noise_window);

        Self {
            config,
            token_store,
            navigator,
            notifier,
            handling_expiry: Arc::new(AtomicBool::new(false)),
            noise,
            expiry_episodes: Arc::new(AtomicU64::new(0)),
            coalesced_reentries: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Register this interceptor as the data layer's global error hook.
    ///
    /// Installing replaces whatever hook was registered before, so
    /// re-mounting during development stays harmless.
    pub fn install<H: FetchErrorHub>(self: &Arc<Self>, hub: &H) {
        let interceptor = Arc::clone(self);
        hub.set_error_hook(Arc::new(move |failure| interceptor.on_fetch_error(failure)));
        tracing::debug!("expiry interceptor installed as global fetch error hook");
    }

    /// Handle one failed request outcome.
    ///
    /// Authorization failures begin (or coalesce into) an expiry episode.
    /// Transport failures are logged and left to the data layer's retry
    /// machinery. Everything else is noise-filtered and surfaced at most
    /// once per window.
    ///
    /// Must be called from within a tokio runtime; the episode reset and
    /// the noise sweep run as spawned timers.
    pub fn on_fetch_error(&self, failure: &FetchFailure) {
        if failure.is_auth_failure() {
            self.begin_expiry_episode(failure);
            return;
        }

        match failure {
            FetchFailure::Transport { reason } => {
                tracing::debug!(
                    reason = %reason,
                    "transport failure, leaving retry to the data layer"
                );
            }
            FetchFailure::Status { status, message } => {
                if self.noise.should_surface(message) {
                    metrics::counter!("session_guard.errors_surfaced").increment(1);
                    self.notifier.notify(NoticeLevel::Error, message);
                } else {
                    metrics::counter!("session_guard.errors_suppressed").increment(1);
                    tracing::debug!(status, "suppressed repeated error notice");
                }
            }
        }
    }

    /// Returns `true` while an expiry episode is in progress.
    #[must_use]
    pub fn handling_expiry(&self) -> bool {
        self.handling_expiry.load(Ordering::SeqCst)
    }

    /// Interceptor counters for dashboards and tests.
    #[must_use]
    pub fn metrics(&self) -> InterceptorMetrics {
        InterceptorMetrics {
            expiry_episodes: self.expiry_episodes.load(Ordering::Relaxed),
            coalesced_reentries: self.coalesced_reentries.load(Ordering::Relaxed),
        }
    }

    fn begin_expiry_episode(&self, failure: &FetchFailure) {
        if self.handling_expiry.swap(true, Ordering::SeqCst) {
            self.coalesced_reentries.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("session_guard.expiry_reentries").increment(1);
            tracing::debug!("expiry episode already in progress, ignoring");
            return;
        }

        let episode = Uuid::new_v4();
        self.expiry_episodes.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("session_guard.expiry_episodes").increment(1);
        tracing::warn!(
            episode = %episode,
            status = ?failure.status(),
            "session rejected by server, signing visitor out"
        );

        // Arm the reset before any side effect runs, so a failure below
        // cannot leave expiry handling locked out past the window.
        let flag = Arc::clone(&self.handling_expiry);
        let window = self.config.expiry_reset_window;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            flag.store(false, Ordering::SeqCst);
            tracing::debug!(episode = %episode, "expiry window closed");
        });

        self.token_store.clear_token();
        self.notifier
            .notify(NoticeLevel::Warning, &self.config.expiry_notice);
        self.navigator
            .navigate(&self.config.login_path, NavigationMode::Replace);
    }
}

/// Metrics for interceptor monitoring.
#[derive(Debug, Clone, Copy)]
pub struct InterceptorMetrics {
    /// Number of expiry episodes begun.
    pub expiry_episodes: u64,

    /// Number of authorization failures coalesced into an open episode.
    pub coalesced_reentries: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockFetchHub, MockNavigator, MockNotifier, MockTokenStore};
    use std::time::Duration;

    struct Harness {
        interceptor: Arc<ExpiryInterceptor<MockTokenStore, MockNavigator, MockNotifier>>,
        store: MockTokenStore,
        navigator: MockNavigator,
        notifier: MockNotifier,
    }

    fn harness() -> Harness {
        let config = Arc::new(
            GuardConfig::new()
                .with_expiry_reset_window(Duration::from_millis(80))
                .with_noise_window(Duration::from_millis(60)),
        );
        let store = MockTokenStore::with_token("tok");
        let navigator = MockNavigator::new();
        let notifier = MockNotifier::new();

        let interceptor = Arc::new(ExpiryInterceptor::new(
            config,
            Arc::new(store.clone()),
            Arc::new(navigator.clone()),
            Arc::new(notifier.clone()),
        ));

        Harness {
            interceptor,
            store,
            navigator,
            notifier,
        }
    }

    fn unauthorized() -> FetchFailure {
        FetchFailure::Status {
            status: 401,
            message: "unauthorized".to_string(),
        }
    }

    #[tokio::test]
    async fn test_auth_failure_starts_expiry_episode() {
        let h = harness();

        h.interceptor.on_fetch_error(&unauthorized());

        assert!(h.interceptor.handling_expiry());
        assert!(h.store.token().is_none());
        assert_eq!(h.notifier.notices().len(), 1);
        assert_eq!(h.notifier.notices()[0].0, NoticeLevel::Warning);
        assert_eq!(
            h.navigator.navigations(),
            vec![("/login".to_string(), NavigationMode::Replace)]
        );
    }

    #[tokio::test]
    async fn test_forbidden_also_counts_as_expiry() {
        let h = harness();

        h.interceptor.on_fetch_error(&FetchFailure::Status {
            status: 403,
            message: "forbidden".to_string(),
        });

        assert!(h.interceptor.handling_expiry());
        assert_eq!(h.navigator.navigation_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_burst_coalesces_into_one_episode() {
        let h = harness();

        for _ in 0..10 {
            h.interceptor.on_fetch_error(&unauthorized());
        }

        assert_eq!(h.notifier.notices().len(), 1);
        assert_eq!(h.navigator.navigation_count(), 1);
        assert_eq!(h.store.clear_calls(), 1);

        let metrics = h.interceptor.metrics();
        assert_eq!(metrics.expiry_episodes, 1);
        assert_eq!(metrics.coalesced_reentries, 9);
    }

    #[tokio::test]
    async fn test_new_episode_after_window_expires() {
        let h = harness();

        h.interceptor.on_fetch_error(&unauthorized());
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(!h.interceptor.handling_expiry());

        h.interceptor.on_fetch_error(&unauthorized());

        assert_eq!(h.notifier.notices().len(), 2);
        assert_eq!(h.navigator.navigation_count(), 2);
        assert_eq!(h.interceptor.metrics().expiry_episodes, 2);
    }

    #[tokio::test]
    async fn test_transport_failure_takes_the_quiet_path() {
        let h = harness();

        h.interceptor.on_fetch_error(&FetchFailure::Transport {
            reason: "dns lookup failed".to_string(),
        });

        assert!(!h.interceptor.handling_expiry());
        assert!(h.notifier.notices().is_empty());
        assert!(h.navigator.navigations().is_empty());
        assert_eq!(h.store.token().as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn test_other_status_surfaces_once_per_window() {
        let h = harness();
        let failure = FetchFailure::Status {
            status: 500,
            message: "billing sync failed".to_string(),
        };

        h.interceptor.on_fetch_error(&failure);
        h.interceptor.on_fetch_error(&failure);

        assert_eq!(h.notifier.notices().len(), 1);
        assert_eq!(h.notifier.notices()[0].0, NoticeLevel::Error);

        // The cache sweep re-admits the message.
        tokio::time::sleep(Duration::from_millis(120)).await;
        h.interceptor.on_fetch_error(&failure);

        assert_eq!(h.notifier.notices().len(), 2);
        assert!(h.navigator.navigations().is_empty());
    }

    #[tokio::test]
    async fn test_distinct_status_messages_both_surface() {
        let h = harness();

        h.interceptor.on_fetch_error(&FetchFailure::Status {
            status: 500,
            message: "billing sync failed".to_string(),
        });
        h.interceptor.on_fetch_error(&FetchFailure::Status {
            status: 502,
            message: "traffic stats unavailable".to_string(),
        });

        assert_eq!(h.notifier.notices().len(), 2);
    }

    #[tokio::test]
    async fn test_install_wires_the_hub_hook() {
        let h = harness();
        let hub = MockFetchHub::new();

        h.interceptor.install(&hub);
        hub.fire(&unauthorized());

        assert!(h.store.token().is_none());
        assert_eq!(h.navigator.navigation_count(), 1);
    }
}
