use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Classification of errors for retry strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// Connection could not be established - retry
    Connect,
    /// Network timeout - retry
    Timeout,
    /// 5xx server error - retry
    ServerError,
    /// Anything else (4xx, malformed payload, ...) - don't retry
    Fatal,
}

impl RetryClass {
    pub fn is_retryable(self) -> bool {
        self != RetryClass::Fatal
    }
}

/// Exponential backoff configuration.
///
/// Attempt `n` (0-indexed) sleeps `base_delay_ms * growth^n`, capped at
/// `max_delay_ms`.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the first retry in milliseconds
    pub base_delay_ms: u64,
    /// Multiplier applied per attempt
    pub growth: f64,
    /// Hard cap on any single delay in milliseconds
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 800,
            growth: 2.0,
            max_delay_ms: 10_000,
        }
    }
}

impl RetryConfig {
    fn delay_for(&self, attempt: u32) -> Duration {
        let raw = self.base_delay_ms as f64 * self.growth.powi(attempt as i32);
        let capped = raw.min(self.max_delay_ms as f64);
        Duration::from_millis(capped as u64)
    }
}

/// Outcome of a retried operation that never succeeded.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// All attempts were consumed; `cause` is the last underlying failure
    #[error("retries exhausted after {attempts} attempts: {cause}")]
    Exhausted { attempts: u32, cause: E },
    /// A non-retryable error was hit; no further attempts were made
    #[error("fatal error on attempt {attempt}: {cause}")]
    Fatal { attempt: u32, cause: E },
}

impl<E> RetryError<E> {
    /// The underlying error, whichever way the retry loop ended.
    pub fn into_cause(self) -> E {
        match self {
            RetryError::Exhausted { cause, .. } => cause,
            RetryError::Fatal { cause, .. } => cause,
        }
    }
}

/// Retry an async operation with exponential backoff.
///
/// `classify` decides per error whether another attempt is worthwhile.
/// Fatal errors short-circuit immediately; retryable errors are re-attempted
/// up to `config.max_attempts` total tries, after which the last error is
/// surfaced inside [`RetryError::Exhausted`] rather than being swallowed.
pub async fn retry_with_backoff<F, Fut, T, E>(
    mut operation: F,
    config: &RetryConfig,
    classify: impl Fn(&E) -> RetryClass,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!("Operation succeeded on attempt {}", attempt + 1);
                }
                return Ok(result);
            }
            Err(e) => {
                let class = classify(&e);

                if !class.is_retryable() {
                    error!("Operation failed with non-retryable error: {}", e);
                    return Err(RetryError::Fatal {
                        attempt: attempt + 1,
                        cause: e,
                    });
                }

                if attempt + 1 >= config.max_attempts {
                    error!(
                        "Operation failed after {} attempts, giving up: {}",
                        attempt + 1,
                        e
                    );
                    return Err(RetryError::Exhausted {
                        attempts: attempt + 1,
                        cause: e,
                    });
                }

                let delay = config.delay_for(attempt);
                warn!(
                    "Operation failed (attempt {}/{}): {} - retrying in {}ms ({:?})",
                    attempt + 1,
                    config.max_attempts,
                    e,
                    delay.as_millis(),
                    class
                );

                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
