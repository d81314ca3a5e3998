//! Deadlines and retries for store calls.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::MessagingConfig;
use crate::messaging::ports::{StoreError, StoreResult};

/// How the services wrap every call into a repository port.
///
/// Each call runs under a deadline. Calls that are safe to repeat go
/// through [`StoreCallPolicy::idempotent`] and are retried on
/// [retryable](StoreError::is_retryable) failures; unconditional writes go
/// through [`StoreCallPolicy::once`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCallPolicy {
    timeout: Duration,
    retries: u32,
    backoff: Duration,
}

impl StoreCallPolicy {
    /// Creates a policy from explicit values.
    #[must_use]
    pub const fn new(timeout: Duration, retries: u32, backoff: Duration) -> Self {
        Self {
            timeout,
            retries,
            backoff,
        }
    }

    /// Creates a policy from service configuration.
    #[must_use]
    pub const fn from_config(config: &MessagingConfig) -> Self {
        Self::new(
            config.store_timeout(),
            config.idempotent_retries,
            config.retry_backoff(),
        )
    }

    /// Deadline applied to each attempt.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs `call` once under the deadline.
    ///
    /// # Errors
    ///
    /// Returns the call's own error, or [`StoreError::Timeout`] when the
    /// deadline elapses first.
    pub async fn once<T, F>(&self, operation: &'static str, call: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .unwrap_or_else(|_| {
                warn!(operation, timeout = ?self.timeout, "store call timed out");
                Err(StoreError::Timeout {
                    operation,
                    after: self.timeout,
                })
            })
    }

    /// Runs `call` under the deadline, repeating it after a fixed backoff
    /// while it fails with a retryable error and attempts remain.
    ///
    /// # Errors
    ///
    /// Returns the first non-retryable error, or the last retryable error
    /// once the retry budget is spent.
    pub async fn idempotent<T, F, Fut>(&self, operation: &'static str, mut call: F) -> StoreResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match self.once(operation, call()).await {
                Err(err) if err.is_retryable() && attempt < self.retries => {
                    attempt = attempt.saturating_add(1);
                    debug!(operation, attempt, error = %err, "retrying store call");
                    tokio::time::sleep(self.backoff).await;
                }
                outcome => return outcome,
            }
        }
    }
}

impl Default for StoreCallPolicy {
    fn default() -> Self {
        Self::from_config(&MessagingConfig::default())
    }
}
