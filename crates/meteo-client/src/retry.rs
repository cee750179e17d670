//! Bounded fixed-delay retry for upstream fetches.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::ApiError;

/// Retries allowed after the first attempt.
pub const MAX_RETRIES: u32 = 10;

/// Wait between two attempts.
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

/// How transient failures are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Fixed delay before each retry.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            delay: RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Check if another retry is allowed after `retries` retries.
    pub fn should_retry(&self, retries: u32) -> bool {
        retries < self.max_retries
    }
}

/// Run `attempt` until it succeeds, fails permanently, or the policy gives up.
///
/// Only [`ApiError::Transient`] is retried. Once the budget is spent the last
/// transient reason is returned as [`ApiError::RetriesExhausted`] without a
/// further wait. Every other error, `NotFound` included, is returned as is.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut attempt: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut retries = 0u32;

    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(ApiError::Transient(reason)) if policy.should_retry(retries) => {
                retries += 1;
                warn!(
                    endpoint = label,
                    retry = retries,
                    max_retries = policy.max_retries,
                    %reason,
                    "Transient fetch failure, retrying"
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(ApiError::Transient(reason)) => {
                return Err(ApiError::RetriesExhausted {
                    attempts: retries + 1,
                    reason,
                });
            }
            Err(e) => return Err(e),
        }
    }
}
