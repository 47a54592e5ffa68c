//! Bounded retry with a side effect before each new attempt.
//!
//! Login, catalog readiness, delete confirmation and downloads all go through
//! [`with_retry`] so that attempt counting, logging and the pause between
//! attempts behave the same everywhere.

use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Zero is treated as one.
    pub max_attempts: u32,
    /// Pause after `before_retry` and before the next attempt.
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    pub const fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{operation} failed after {attempts} attempt(s): {last_error}")]
pub struct Exhausted<E> {
    pub operation: String,
    pub attempts: u32,
    pub last_error: E,
}

/// Runs `attempt` until it succeeds or the policy is used up.
///
/// `attempt` receives the shared state and the 1-based attempt number.
/// `before_retry` runs only when another attempt follows a failure.
pub async fn with_retry<S, T, E>(
    policy: &RetryPolicy,
    operation: &str,
    state: &mut S,
    mut attempt: impl AsyncFnMut(&mut S, u32) -> Result<T, E>,
    mut before_retry: impl AsyncFnMut(&mut S),
) -> Result<T, Exhausted<E>>
where
    S: ?Sized,
    E: fmt::Display,
{
    let max = policy.attempts();
    let mut n = 1;
    loop {
        match attempt(&mut *state, n).await {
            Ok(value) => {
                if n > 1 {
                    debug!("{} succeeded on attempt {}/{}", operation, n, max);
                }
                return Ok(value);
            }
            Err(e) if n >= max => {
                warn!("{} failed on final attempt {}/{}: {}", operation, n, max, e);
                return Err(Exhausted {
                    operation: operation.to_string(),
                    attempts: n,
                    last_error: e,
                });
            }
            Err(e) => {
                warn!("{} failed (attempt {}/{}): {}", operation, n, max, e);
                before_retry(&mut *state).await;
                if !policy.delay.is_zero() {
                    tokio::time::sleep(policy.delay).await;
                }
                n += 1;
            }
        }
    }
}
