//! Retry support for transport-level failures.
//!
//! Only failures without a status are worth retrying: the request never
//! reached the server, so asking again is meaningful. A server that
//! already answered will answer the same way, so status failures return
//! immediately no matter how many attempts remain.
//!
//! # Example
//!
//! ```rust
//! use portal_guard::retry::{RetryPolicy, retry_transport};
//! use portal_guard::FetchFailure;
//!
//! # async fn example() -> Result<(), FetchFailure> {
//! let policy = RetryPolicy::new()
//!     .with_max_retries(3)
//!     .with_initial_delay(std::time::Duration::from_millis(100));
//!
//! let body = retry_transport(policy, || async {
//!     // Your request here
//!     Ok::<_, FetchFailure>("pong".to_string())
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use tokio::time::sleep;

use crate::error::FetchFailure;

/// Doubling past this point saturates anyway; keeps the shift in range.
const MAX_DOUBLINGS: u32 = 16;

/// How often and how patiently transport failures are retried.
///
/// Each retry waits twice as long as the previous one, capped at
/// `max_delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// How many retries follow the initial attempt.
    ///
    /// Default: 3
    pub max_retries: u32,

    /// Wait before the first retry.
    ///
    /// Default: 100ms
    pub initial_delay: Duration,

    /// Ceiling on the doubling wait.
    ///
    /// Default: 10 seconds
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy with default attempts and delays.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
        }
    }

    /// Set how many retries follow the initial attempt.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the wait before the first retry.
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the ceiling on the doubling wait.
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Wait before retry number `attempt` (zero-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1_u32 << attempt.min(MAX_DOUBLINGS);

        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Retry an async request while its failures stay retryable.
///
/// Terminal failures ([`FetchFailure::Status`]) return immediately;
/// transport failures are retried with doubling backoff until one
/// succeeds or attempts run out.
///
/// # Errors
///
/// Returns the last [`FetchFailure`] once a terminal failure is seen or
/// retries are exhausted.
pub async fn retry_transport<F, Fut, T>(
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T, FetchFailure>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchFailure>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::info!(attempt, "request succeeded after retry");
                }
                return Ok(result);
            }
            Err(failure) => {
                if !failure.is_retryable() {
                    tracing::debug!(error = %failure, "failure is terminal, not retrying");
                    return Err(failure);
                }

                if attempt >= policy.max_retries {
                    tracing::warn!(
                        attempt,
                        error = %failure,
                        "request failed after max retries"
                    );
                    return Err(failure);
                }

                let delay = policy.delay_for(attempt);
                tracing::debug!(
                    attempt,
                    delay_ms = delay.as_millis(),
                    error = %failure,
                    "transport failure, retrying"
                );

                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
