//! Single-flight session validation.
//!
//! Route evaluation, tab refocus, and background widgets can all ask "is
//! this session still alive?" at the same moment. The validator collapses
//! every overlapping caller onto one remote probe call and hands them all
//! the same verdict.
//!
//! # Flight lifecycle
//!
//! The first caller opens a flight and stores its shared handle; callers
//! arriving while the flight is open join that handle. The flight itself
//! empties the slot before its verdict becomes visible, so the next
//! validation after completion always probes fresh.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use portal_guard::mocks::MockTokenStore;
//! use portal_guard::{SessionStatus, SessionValidator, SessionVerdict};
//!
//! # async fn example() -> portal_guard::Result<()> {
//! let validator = SessionValidator::new(Arc::new(MockTokenStore::with_token("tok")));
//! validator.register_probe(|| async { Ok(SessionStatus { logged_in: true }) });
//!
//! assert_eq!(validator.validate().await?, SessionVerdict::Valid);
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use crate::error::{FetchFailure, GuardError, Result};
use crate::providers::{SessionStatus, TokenStore};

/// Outcome of one session validation.
///
/// Verdicts are never cached beyond the flight that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionVerdict {
    /// The identity service recognizes the session.
    Valid,

    /// No live session: the service said no, or could not be reached.
    Invalid,
}

impl SessionVerdict {
    /// Returns `true` for [`SessionVerdict::Valid`].
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

type ProbeFuture = BoxFuture<'static, std::result::Result<SessionStatus, FetchFailure>>;
type ProbeFn = Arc<dyn Fn() -> ProbeFuture + Send + Sync>;
type ValidationFlight = Shared<BoxFuture<'static, SessionVerdict>>;

/// Single-flight coordinator for remote session validation.
///
/// Concurrent [`validate`](Self::validate) calls share one probe call and
/// observe the same [`SessionVerdict`]. Any `Invalid` verdict clears the
/// stored token before the verdict is released to callers.
pub struct SessionValidator<S> {
    token_store: Arc<S>,
    probe: Arc<RwLock<Option<ProbeFn>>>,
    in_flight: Arc<tokio::sync::Mutex<Option<ValidationFlight>>>,
    // Metrics
    flights_started: Arc<AtomicU64>,
    callers_joined: Arc<AtomicU64>,
}

impl<S> Clone for SessionValidator<S> {
    fn clone(&self) -> Self {
        Self {
            token_store: Arc::clone(&self.token_store),
            probe: Arc::clone(&self.probe),
            in_flight: Arc::clone(&self.in_flight),
            flights_started: Arc::clone(&self.flights_started),
            callers_joined: Arc::clone(&self.callers_joined),
        }
    }
}

impl<S> std::fmt::Debug for SessionValidator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let probe_registered = self
            .probe
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();

        f.debug_struct("SessionValidator")
            .field("probe_registered", &probe_registered)
            .finish_non_exhaustive()
    }
}

impl<S> SessionValidator<S>
where
    S: TokenStore + 'static,
{
    /// Create a validator over `token_store`.
    ///
    /// No probe is registered yet; [`validate`](Self::validate) fails fast
    /// until [`register_probe`](Self::register_probe) has been called.
    #[must_use]
    pub fn new(token_store: Arc<S>) -> Self {
        Self {
            token_store,
            probe: Arc::new(RwLock::new(None)),
            in_flight: Arc::new(tokio::sync::Mutex::new(None)),
            flights_started: Arc::new(AtomicU64::new(0)),
            callers_joined: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Register the remote probe used by every flight.
    ///
    /// Registering again replaces the previous probe, which keeps
    /// re-mounting during development harmless. Flights already open keep
    /// the probe they started with.
    pub fn register_probe<F, Fut>(&self, probe: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<SessionStatus, FetchFailure>> + Send + 'static,
    {
        let wrapped: ProbeFn = Arc::new(move || probe().boxed());

        let mut slot = self
            .probe
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            tracing::debug!("replacing previously registered session probe");
        }
        *slot = Some(wrapped);
    }

    /// Returns `true` once a probe has been registered.
    #[must_use]
    pub fn probe_registered(&self) -> bool {
        self.probe
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Validate the current session.
    ///
    /// Joins the in-flight validation if one is open, otherwise opens one.
    /// Probe failures never surface here: the flight logs them and treats
    /// the session as [`SessionVerdict::Invalid`], clearing the stored
    /// token on the way out.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::ProbeNotRegistered`] if no probe has been
    /// registered. This is the only error `validate` can return.
    pub async fn validate(&self) -> Result<SessionVerdict> {
        let flight = {
            let mut slot = self.in_flight.lock().await;

            if let Some(flight) = slot.as_ref() {
                self.callers_joined.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("session_guard.validations", "flight" => "joined").increment(1);
                tracing::debug!("joining in-flight session validation");
                flight.clone()
            } else {
                let probe = self.registered_probe()?;
                let flight = self.open_flight(probe);
                *slot = Some(flight.clone());
                self.flights_started.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("session_guard.validations", "flight" => "started").increment(1);
                tracing::debug!("opening session validation flight");
                flight
            }
        };

        Ok(flight.await)
    }

    /// Validation counters for dashboards and tests.
    #[must_use]
    pub fn metrics(&self) -> ValidatorMetrics {
        ValidatorMetrics {
            flights_started: self.flights_started.load(Ordering::Relaxed),
            callers_joined: self.callers_joined.load(Ordering::Relaxed),
        }
    }

    fn registered_probe(&self) -> Result<ProbeFn> {
        self.probe
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(GuardError::ProbeNotRegistered)
    }

    fn open_flight(&self, probe: ProbeFn) -> ValidationFlight {
        let token_store = Arc::clone(&self.token_store);
        let in_flight = Arc::clone(&self.in_flight);

        async move {
            let verdict = match probe().await {
                Ok(status) if status.logged_in => SessionVerdict::Valid,
                Ok(_) => {
                    tracing::info!("identity service reports no live session");
                    SessionVerdict::Invalid
                }
                Err(failure) => {
                    tracing::warn!(
                        error = %failure,
                        retryable = failure.is_retryable(),
                        "session probe failed, treating session as invalid"
                    );
                    SessionVerdict::Invalid
                }
            };

            if verdict == SessionVerdict::Invalid {
                token_store.clear_token();
            }

            // Empty the slot before the verdict becomes visible so the
            // next validation starts a fresh flight.
            *in_flight.lock().await = None;

            let label = match verdict {
                SessionVerdict::Valid => "valid",
                SessionVerdict::Invalid => "invalid",
            };
            metrics::counter!("session_guard.verdicts", "verdict" => label).increment(1);

            verdict
        }
        .boxed()
        .shared()
    }
}

/// Metrics for validator monitoring.
#[derive(Debug, Clone, Copy)]
pub struct ValidatorMetrics {
    /// Number of validation flights opened.
    pub flights_started: u64,

    /// Number of callers that joined an already-open flight.
    pub callers_joined: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockTokenStore;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn validator_with_token() -> (SessionValidator<MockTokenStore>, MockTokenStore) {
        let store = MockTokenStore::with_token("tok_123");
        let validator = SessionValidator::new(Arc::new(store.clone()));
        (validator, store)
    }

    #[tokio::test]
    async fn test_validate_without_probe_fails_fast() {
        let (validator, store) = validator_with_token();

        let result = validator.validate().await;

        assert_eq!(result, Err(GuardError::ProbeNotRegistered));
        assert!(store.token().is_some()); // Nothing was touched
    }

    #[tokio::test]
    async fn test_valid_session_keeps_token() {
        let (validator, store) = validator_with_token();
        validator.register_probe(|| async { Ok(SessionStatus { logged_in: true }) });

        let verdict = validator.validate().await.unwrap();

        assert_eq!(verdict, SessionVerdict::Valid);
        assert!(verdict.is_valid());
        assert_eq!(store.token().as_deref(), Some("tok_123"));
        assert_eq!(store.clear_calls(), 0);
    }

    #[tokio::test]
    async fn test_logged_out_answer_clears_token() {
        let (validator, store) = validator_with_token();
        validator.register_probe(|| async { Ok(SessionStatus { logged_in: false }) });

        let verdict = validator.validate().await.unwrap();

        assert_eq!(verdict, SessionVerdict::Invalid);
        assert!(store.token().is_none());
        assert_eq!(store.clear_calls(), 1);
    }

    #[tokio::test]
    async fn test_probe_failure_swallowed_and_clears_token() {
        let (validator, store) = validator_with_token();
        validator.register_probe(|| async {
            Err(FetchFailure::Transport {
                reason: "connection refused".to_string(),
            })
        });

        // The failure never escapes; it is normalized to Invalid.
        let verdict = validator.validate().await.unwrap();

        assert_eq!(verdict, SessionVerdict::Invalid);
        assert!(store.token().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_probe_call() {
        let (validator, _store) = validator_with_token();

        let probe_calls = Arc::new(AtomicUsize::new(0));
        let calls = Arc::clone(&probe_calls);
        validator.register_probe(move || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok(SessionStatus { logged_in: true })
            }
        });

        let mut handles = Vec::new();
        for _ in 0..10 {
            let validator = validator.clone();
            handles.push(tokio::spawn(async move { validator.validate().await }));
        }

        for handle in handles {
            let verdict = handle.await.unwrap().unwrap();
            assert_eq!(verdict, SessionVerdict::Valid);
        }

        assert_eq!(probe_calls.load(Ordering::SeqCst), 1);
        assert_eq!(validator.metrics().flights_started, 1);
    }

    #[tokio::test]
    async fn test_sequential_validations_probe_fresh() {
        let (validator, _store) = validator_with_token();

        let probe_calls = Arc::new(AtomicUsize::new(0));
        let calls = Arc::clone(&probe_calls);
        validator.register_probe(move || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(SessionStatus { logged_in: true })
            }
        });

        validator.validate().await.unwrap();
        validator.validate().await.unwrap();

        // Verdicts are not cached across flights.
        assert_eq!(probe_calls.load(Ordering::SeqCst), 2);
        assert_eq!(validator.metrics().flights_started, 2);
    }

    #[tokio::test]
    async fn test_reregistering_probe_replaces_it() {
        let (validator, store) = validator_with_token();

        validator.register_probe(|| async { Ok(SessionStatus { logged_in: false }) });
        assert_eq!(
            validator.validate().await.unwrap(),
            SessionVerdict::Invalid
        );

        store.set_token("tok_456");
        validator.register_probe(|| async { Ok(SessionStatus { logged_in: true }) });
        assert_eq!(validator.validate().await.unwrap(), SessionVerdict::Valid);
        assert!(validator.probe_registered());
    }
}
