//! One-shot wiring at the application root.
//!
//! Feature code never touches the guard. The application shell mounts it
//! once, registers the remote probe, installs the fetch hook, and forwards
//! router events; everything else happens behind the facade.
//!
//! # Example
//!
//! ```rust
//! use portal_guard::mocks::{MockFetchHub, MockNavigator, MockNotifier, MockTokenStore};
//! use portal_guard::{GuardConfig, GuardEnvironment, RouteTable, SessionGuard, SessionStatus};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> portal_guard::Result<()> {
//! let routes = RouteTable::builder()
//!     .public("/")
//!     .entry("/login")
//!     .build()?;
//!
//! let env = GuardEnvironment::new(
//!     MockTokenStore::new(),
//!     MockNavigator::new(),
//!     MockNotifier::new(),
//! );
//!
//! let guard = SessionGuard::mount(GuardConfig::new(), routes, env);
//! guard.register_probe(|| async { Ok(SessionStatus { logged_in: true }) });
//!
//! let hub = MockFetchHub::new();
//! guard.install_interceptor(&hub);
//! guard.route_changed();
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::config::GuardConfig;
use crate::error::{FetchFailure, Result};
use crate::interceptor::ExpiryInterceptor;
use crate::navigation::NavigationGuard;
use crate::providers::{FetchErrorHub, Navigator, Notifier, SessionStatus, TokenStore};
use crate::routes::RouteTable;
use crate::validator::{SessionValidator, SessionVerdict};

/// Everything the guard needs from the host application.
///
/// # Type Parameters
///
/// - `S`: Token store
/// - `N`: Navigator
/// - `T`: Notifier
pub struct GuardEnvironment<S, N, T> {
    /// Session token storage.
    pub token_store: Arc<S>,

    /// Router surface.
    pub navigator: Arc<N>,

    /// Toast surface.
    pub notifier: Arc<T>,
}

impl<S, N, T> Clone for GuardEnvironment<S, N, T> {
    fn clone(&self) -> Self {
        Self {
            token_store: Arc::clone(&self.token_store),
            navigator: Arc::clone(&self.navigator),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<S, N, T> GuardEnvironment<S, N, T>
where
    S: TokenStore,
    N: Navigator,
    T: Notifier,
{
    /// Create a new guard environment.
    #[must_use]
    pub fn new(token_store: S, navigator: N, notifier: T) -> Self {
        Self {
            token_store: Arc::new(token_store),
            navigator: Arc::new(navigator),
            notifier: Arc::new(notifier),
        }
    }
}

/// The assembled session guard.
///
/// Holds the three components over one shared environment: the
/// single-flight validator, the navigation guard, and the expiry
/// interceptor.
pub struct SessionGuard<S, N, T> {
    validator: SessionValidator<S>,
    navigation: NavigationGuard<S, N>,
    interceptor: Arc<ExpiryInterceptor<S, N, T>>,
}

impl<S, N, T> SessionGuard<S, N, T>
where
    S: TokenStore + 'static,
    N: Navigator + 'static,
    T: Notifier + 'static,
{
    /// Assemble the guard over `env`.
    ///
    /// The navigation guard starts attached; the interceptor does nothing
    /// until [`install_interceptor`](Self::install_interceptor) hands it
    /// to the fetch layer.
    #[must_use]
    pub fn mount(config: GuardConfig, routes: RouteTable, env: GuardEnvironment<S, N, T>) -> Self {
        let config = Arc::new(config);
        let routes = Arc::new(routes);

        let validator = SessionValidator::new(Arc::clone(&env.token_store));
        let navigation = NavigationGuard::new(
            Arc::clone(&config),
            Arc::clone(&routes),
            validator.clone(),
            Arc::clone(&env.token_store),
            Arc::clone(&env.navigator),
        );
        let interceptor = Arc::new(ExpiryInterceptor::new(
            config,
            env.token_store,
            env.navigator,
            env.notifier,
        ));

        tracing::info!("session guard mounted");

        Self {
            validator,
            navigation,
            interceptor,
        }
    }

    /// Register the remote session probe.
    ///
    /// See [`SessionValidator::register_probe`].
    pub fn register_probe<F, Fut>(&self, probe: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<SessionStatus, FetchFailure>> + Send + 'static,
    {
        self.validator.register_probe(probe);
    }

    /// Install the expiry interceptor as `hub`'s global error hook.
    pub fn install_interceptor<H: FetchErrorHub>(&self, hub: &H) {
        self.interceptor.install(hub);
    }

    /// Forward a router event to the navigation guard.
    pub fn route_changed(&self) {
        self.navigation.route_changed();
    }

    /// Validate the current session through the single-flight validator.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GuardError::ProbeNotRegistered`] if no probe has
    /// been registered.
    pub async fn validate(&self) -> Result<SessionVerdict> {
        self.validator.validate().await
    }

    /// Tear down the navigation guard.
    pub fn detach(&self) {
        self.navigation.detach();
    }

    /// The single-flight validator.
    #[must_use]
    pub const fn validator(&self) -> &SessionValidator<S> {
        &self.validator
    }

    /// The navigation guard.
    #[must_use]
    pub const fn navigation(&self) -> &NavigationGuard<S, N> {
        &self.navigation
    }

    /// The expiry interceptor.
    #[must_use]
    pub const fn interceptor(&self) -> &Arc<ExpiryInterceptor<S, N, T>> {
        &self.interceptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockFetchHub, MockNavigator, MockNotifier, MockTokenStore};
    use crate::providers::NavigationMode;
    use std::time::Duration;

    #[tokio::test]
    async fn test_mount_assembles_working_components() {
        let routes = RouteTable::builder().entry("/login").build().unwrap();
        let env = GuardEnvironment::new(
            MockTokenStore::with_token("tok"),
            MockNavigator::new(),
            MockNotifier::new(),
        );
        let navigator = Arc::clone(&env.navigator);

        let guard = SessionGuard::mount(
            GuardConfig::new().with_debounce_window(Duration::from_millis(20)),
            routes,
            env,
        );
        guard.register_probe(|| async { Ok(SessionStatus { logged_in: true }) });

        assert!(guard.validator().probe_registered());
        assert!(guard.navigation().is_attached());

        navigator.set_current_path("/billing");
        guard.route_changed();
        tokio::time::sleep(Duration::from_millis(80)).await;

        // Valid session on a protected route: nothing to correct.
        assert!(navigator.navigations().is_empty());
    }

    #[tokio::test]
    async fn test_mounted_interceptor_reaches_shared_environment() {
        let routes = RouteTable::builder().entry("/login").build().unwrap();
        let env = GuardEnvironment::new(
            MockTokenStore::with_token("tok"),
            MockNavigator::new(),
            MockNotifier::new(),
        );
        let store = Arc::clone(&env.token_store);
        let navigator = Arc::clone(&env.navigator);

        let guard = SessionGuard::mount(GuardConfig::new(), routes, env);
        let hub = MockFetchHub::new();
        guard.install_interceptor(&hub);

        hub.fire(&FetchFailure::Status {
            status: 401,
            message: "unauthorized".to_string(),
        });

        assert!(store.token().is_none());
        assert_eq!(
            navigator.navigations(),
            vec![("/login".to_string(), NavigationMode::Replace)]
        );
        assert!(guard.interceptor().handling_expiry());
    }
}
