//! Bounded retry with exponential backoff for outbound provider calls.
//!
//! Only failures whose error chain contains a transient [`ProviderError`]
//! are retried; everything else (bad credentials, malformed responses,
//! non-HTTP errors) fails on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::ProviderError;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the initial attempt
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

pub fn is_transient(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<ProviderError>())
        .any(ProviderError::is_transient)
}

/// Run `operation` until it succeeds, fails permanently, or the retry budget runs out.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
) -> anyhow::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!("{label} succeeded after {attempt} retries");
                }
                return Ok(value);
            }
            Err(e) if attempt < policy.max_retries && is_transient(&e) => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    "{label} failed (attempt {}/{}), retrying in {delay:?}: {e:#}",
                    attempt + 1,
                    policy.max_retries + 1
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
