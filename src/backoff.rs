//! Retry with exponential backoff for fallible async calls

use std::fmt;
use std::future::Future;
use std::time::Duration;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Retry policy for failed requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy
{   pub max_retries: usize
  , pub initial_delay: Duration
  , pub max_delay: Duration
}

impl RetryPolicy
{   /// Create a new retry policy
    pub fn new(
      max_retries: usize
    , initial_delay_ms: u64
    , max_delay_ms: u64
    ) -> Self
    {   RetryPolicy
        {   max_retries
          , initial_delay: Duration::from_millis(initial_delay_ms)
          , max_delay: Duration::from_millis(max_delay_ms)
        }
    }

    /// Total attempts allowed, the first one included
    pub fn max_attempts(&self) -> usize
    {   self.max_retries.saturating_add(1)
    }

    /// Wait after the given failed attempt (1-indexed):
    /// `initial_delay * 2^(attempt - 1)`, capped at `max_delay`
    pub fn delay_after_attempt(
      &self
    , attempt: usize
    ) -> Duration
    {   let exponent = attempt.saturating_sub(1);
        let factor = u32::try_from(exponent)
          .ok()
          .and_then(|e| 1u32.checked_shl(e))
          .unwrap_or(u32::MAX);
        self.initial_delay
          .saturating_mul(factor)
          .min(self.max_delay)
    }
}

impl Default for RetryPolicy
{   fn default() -> Self
    {   RetryPolicy::new(3, 1000, 10_000)
    }
}

/// Run `operation` until it succeeds or the policy is exhausted.
///
/// The error of the last attempt is returned as-is.
pub async fn execute<T, E, F, Fut>(
  operation: F
, policy: &RetryPolicy
) -> Result<T, E>
where
  F: FnMut() -> Fut
, Fut: Future<Output = Result<T, E>>
, E: fmt::Display
{   execute_if(operation, policy, |_| true).await
}

/// Like [`execute`], but stops early on errors for which
/// `should_retry` returns false.
pub async fn execute_if<T, E, F, Fut, P>(
  mut operation: F
, policy: &RetryPolicy
, should_retry: P
) -> Result<T, E>
where
  F: FnMut() -> Fut
, Fut: Future<Output = Result<T, E>>
, E: fmt::Display
, P: Fn(&E) -> bool
{   let max_attempts = policy.max_attempts();
    let mut attempt = 1;

    loop
    {   debug!("Attempt {}/{}", attempt, max_attempts);
        match operation().await
        {   Ok(value) => return Ok(value)
          , Err(e) => {
              if attempt >= max_attempts
              {   warn!(
                    "Giving up after {} attempts: {}",
                    attempt, e
                  );
                  return Err(e);
              }
              if !should_retry(&e)
              {   debug!("Error is not retryable: {}", e);
                  return Err(e);
              }

              let delay = policy.delay_after_attempt(attempt);
              warn!(
                "Attempt {} failed, retrying in {:?}: {}",
                attempt, delay, e
              );
              tokio::time::sleep(delay).await;
              attempt += 1;
            }
        }
    }
}
