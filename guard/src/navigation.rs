//! Debounced navigation guarding.
//!
//! Redirect chains fire several route events in quick succession; only the
//! route the visitor actually settles on deserves a session check. The
//! guard schedules one evaluation per burst, cancels it when a newer event
//! supersedes it, and reads the router's current path at evaluation time
//! rather than trusting the event that scheduled it.
//!
//! # Decision table
//!
//! | Route     | Token | Verdict  | Action                          |
//! |-----------|-------|----------|---------------------------------|
//! | public    | any   | -        | allow, no probe                 |
//! | entry     | none  | -        | allow                           |
//! | entry     | some  | valid    | replace-navigate to home        |
//! | entry     | some  | invalid  | stay (token already cleared)    |
//! | protected | none  | -        | replace-navigate to login       |
//! | protected | some  | valid    | allow                           |
//! | protected | some  | invalid  | clear token, replace to login   |
//!
//! Validation errors are handled exactly like `invalid`: an ambiguous
//! check never leaves a protected page readable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;

use crate::config::GuardConfig;
use crate::providers::{NavigationMode, Navigator, TokenStore};
use crate::routes::{RouteAccess, RouteTable};
use crate::validator::{SessionValidator, SessionVerdict};

/// Debounced route-change evaluator.
///
/// One instance guards the whole route tree and lives for the lifetime of
/// the mounted application shell. [`detach`](Self::detach) tears it down;
/// late verdicts after detach never navigate.
pub struct NavigationGuard<S, N> {
    config: Arc<GuardConfig>,
    routes: Arc<RouteTable>,
    validator: SessionValidator<S>,
    token_store: Arc<S>,
    navigator: Arc<N>,
    attached: Arc<AtomicBool>,
    pending: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl<S, N> Clone for NavigationGuard<S, N> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            routes: Arc::clone(&self.routes),
            validator: self.validator.clone(),
            token_store: Arc::clone(&self.token_store),
            navigator: Arc::clone(&self.navigator),
            attached: Arc::clone(&self.attached),
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<S, N> std::fmt::Debug for NavigationGuard<S, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationGuard")
            .field("attached", &self.attached.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl<S, N> NavigationGuard<S, N>
where
    S: TokenStore + 'static,
    N: Navigator + 'static,
{
    /// Create a guard. It starts attached.
    #[must_use]
    pub fn new(
        config: Arc<GuardConfig>,
        routes: Arc<RouteTable>,
        validator: SessionValidator<S>,
        token_store: Arc<S>,
        navigator: Arc<N>,
    ) -> Self {
        Self {
            config,
            routes,
            validator,
            token_store,
            navigator,
            attached: Arc::new(AtomicBool::new(true)),
            pending: Arc::new(Mutex::new(None)),
        }
    }

    /// Note that the route changed.
    ///
    /// Cancels any pending evaluation and schedules a fresh one for
    /// `debounce_window` from now. Paths the visitor merely passed through
    /// are never evaluated; the evaluation reads the router's current path
    /// when the window closes.
    ///
    /// Must be called from within a tokio runtime; evaluations are spawned
    /// onto it.
    pub fn route_changed(&self) {
        if !self.attached.load(Ordering::SeqCst) {
            return;
        }

        let guard = self.clone();
        let debounce = self.config.debounce_window;

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);

        // Cancel-then-replace under one lock so concurrent route events
        // cannot leave an orphaned evaluation running.
        if let Some(superseded) = pending.take() {
            superseded.abort();
            tracing::trace!("superseded pending route evaluation");
        }

        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            if !guard.attached.load(Ordering::SeqCst) {
                return;
            }

            guard.evaluate_current_path().await;
        }));
    }

    /// Tear the guard down.
    ///
    /// Aborts the pending evaluation and suppresses navigation from any
    /// evaluation already past its timer. `route_changed` becomes a no-op.
    pub fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = pending.take() {
            task.abort();
        }

        tracing::debug!("navigation guard detached");
    }

    /// Returns `true` until [`detach`](Self::detach) is called.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    async fn evaluate_current_path(&self) {
        let path = self.navigator.current_path();
        let access = self.routes.classify(&path);
        metrics::counter!("session_guard.route_evaluations").increment(1);

        match access {
            RouteAccess::Public => {
                tracing::trace!(path = %path, "public route, no session required");
            }
            RouteAccess::Entry => self.evaluate_entry(&path).await,
            RouteAccess::Protected => self.evaluate_protected(&path).await,
        }
    }

    async fn evaluate_entry(&self, path: &str) {
        if self.token_store.token().is_none() {
            tracing::trace!(path = %path, "anonymous visitor on login route");
            return;
        }

        match self.validator.validate().await {
            Ok(SessionVerdict::Valid) => {
                tracing::debug!(
                    path = %path,
                    to = %self.config.home_path,
                    "already signed in, leaving login route"
                );
                self.redirect(&self.config.home_path, "home");
            }
            Ok(SessionVerdict::Invalid) => {
                // The flight already cleared the stale token; the login
                // page is exactly where this visitor belongs.
                tracing::debug!(path = %path, "stale token on login route");
            }
            Err(error) => {
                tracing::error!(error = %error, "session validation unavailable");
                self.token_store.clear_token();
            }
        }
    }

    async fn evaluate_protected(&self, path: &str) {
        if self.token_store.token().is_none() {
            tracing::debug!(path = %path, "anonymous visitor on protected route");
            self.redirect(&self.config.login_path, "login");
            return;
        }

        let verdict = match self.validator.validate().await {
            Ok(verdict) => verdict,
            Err(error) => {
                tracing::error!(
                    error = %error,
                    "session validation unavailable, treating session as invalid"
                );
                SessionVerdict::Invalid
            }
        };

        match verdict {
            SessionVerdict::Valid => {
                tracing::trace!(path = %path, "session valid");
            }
            SessionVerdict::Invalid => {
                // Idempotent re-clear: the flight clears on its own
                // Invalid verdicts, but not on the unavailable path above.
                self.token_store.clear_token();
                self.redirect(&self.config.login_path, "login");
            }
        }
    }

    /// Issue a corrective replace-navigation, unless the guard detached
    /// while the evaluation was suspended.
    fn redirect(&self, to: &str, target: &'static str) {
        if !self.attached.load(Ordering::SeqCst) {
            tracing::debug!(to = %to, "skipping corrective navigation, guard detached");
            return;
        }

        metrics::counter!("session_guard.redirects", "target" => target).increment(1);
        self.navigator.navigate(to, NavigationMode::Replace);
    }
}
