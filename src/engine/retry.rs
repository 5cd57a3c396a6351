//! Bounded retry for operations with transient fault kinds
//!
//! A [`RetryPolicy`] wraps an async operation together with a predicate that
//! declares which of its failures are transient. Transient failures are logged
//! at warn level and retried up to the attempt bound; the final failure is
//! propagated unchanged. Any failure outside the declared set propagates
//! immediately. There is no delay between attempts.

use std::fmt::Display;
use std::future::Future;

/// Default number of attempts
pub const DEFAULT_RETRY_COUNT: u32 = 3;

/// Bounded, fixed (no-backoff) retry policy
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_COUNT)
    }
}

impl RetryPolicy {
    /// Creates a policy that runs an operation at most `attempts` times
    ///
    /// An attempt bound of zero is treated as one: the operation always runs
    /// at least once.
    pub fn new(attempts: u32) -> Self {
        Self {
            attempts: attempts.max(1),
        }
    }

    /// Returns the attempt bound
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Runs `op`, retrying failures for which `is_transient` returns true
    ///
    /// Logs one warning per failed transient attempt, with the attempt count.
    /// The error from the last attempt is returned unchanged; non-transient
    /// errors are returned after the first occurrence.
    pub async fn run<T, E, F, Fut, C>(&self, what: &str, is_transient: C, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Fn(&E) -> bool,
        E: Display,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if is_transient(&e) => {
                    tracing::warn!(
                        "retry {}: {} (attempt {} of {})",
                        what,
                        e,
                        attempt,
                        self.attempts
                    );
                    if attempt >= self.attempts {
                        return Err(e);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}
