//! Fixed-delay retry policy for model calls.

use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::error::ModelError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(5);

/// How often, how patiently, and on which errors a call is retried.
///
/// The delay is per call: two clients sharing a policy value never share a timer.
#[derive(Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,

    /// Fixed delay between attempts.
    pub backoff: Duration,

    /// Errors for which another attempt is made.
    pub retry_if: fn(&ModelError) -> bool,
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
            retry_if: ModelError::is_transient,
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is spent. The last error is returned on exhaustion.
    ///
    /// `op` receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, ModelError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ModelError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < max_attempts && (self.retry_if)(&err) => {
                    debug!(
                        attempt,
                        max_attempts,
                        backoff_ms = self.backoff.as_millis() as u64,
                        error = %err,
                        "Retrying model call"
                    );
                    tokio::time::sleep(self.backoff).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
