//! Retry logic with exponential backoff.
//!
//! One policy covers every upstream operation. Whether an error is worth
//! another attempt is decided by [`GeminiError::is_retryable`], which branches
//! on the structured status carried by the error.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use crate::error::GeminiError;

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first one.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Multiplier for exponential backoff (e.g., 2.0 for doubling).
    pub multiplier: f64,
    /// Honor `Retry-After` hints from 429/503 responses.
    pub respect_retry_after: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(60),
            multiplier: 2.0,
            respect_retry_after: true,
        }
    }
}

impl RetryConfig {
    /// Creates a configuration with no retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Delay to wait before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        if !secs.is_finite() || secs >= self.max_delay.as_secs_f64() {
            return self.max_delay;
        }
        Duration::from_secs_f64(secs.max(0.0))
    }

    /// Full list of waits when every attempt fails.
    pub fn backoff_schedule(&self) -> Vec<Duration> {
        (1..=self.max_retries).map(|retry| self.delay_for(retry)).collect()
    }
}

/// Executes operations with retry logic and exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    /// Creates a new retry executor with the given configuration.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Creates a retry executor with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(RetryConfig::default())
    }

    /// Executes an operation with retry logic.
    ///
    /// The closure is invoked once per attempt. Terminal errors and the last
    /// error after exhaustion are returned unchanged. Sleeps are
    /// `tokio::time::sleep`, so dropping the returned future abandons both the
    /// pending wait and any later attempt.
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, operation: F) -> Result<T, GeminiError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, GeminiError>>,
    {
        let mut retries = 0;

        loop {
            match operation().await {
                Ok(result) => {
                    if retries > 0 {
                        tracing::info!(
                            operation = operation_name,
                            retries,
                            "Operation succeeded after retrying"
                        );
                    }
                    return Ok(result);
                }
                Err(e) if e.is_retryable() && retries < self.config.max_retries => {
                    retries += 1;

                    let backoff = self.config.delay_for(retries);
                    let wait = match e.retry_after() {
                        Some(hint) if self.config.respect_retry_after => hint.min(self.config.max_delay),
                        _ => backoff,
                    };

                    tracing::warn!(
                        operation = operation_name,
                        attempt = retries,
                        max_retries = self.config.max_retries,
                        status = ?e.status_code(),
                        wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "Retryable error, backing off"
                    );

                    sleep(wait).await;
                }
                Err(e) => {
                    if retries > 0 {
                        tracing::error!(
                            operation = operation_name,
                            retries,
                            error = %e,
                            "Operation failed after retrying"
                        );
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Returns the retry configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiErrorInfo, RequestError, ServerError};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn server_error() -> GeminiError {
        GeminiError::Server(ServerError::InternalError {
            info: ApiErrorInfo::new(500, Some("INTERNAL".into()), "boom"),
        })
    }

    #[test]
    fn test_default_schedule_is_one_two_four_seconds() {
        let config = RetryConfig::default();
        assert_eq!(
            config.backoff_schedule(),
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
            ]
        );
    }

    #[test]
    fn test_delay_is_capped() {
        let config = RetryConfig {
            max_retries: 10,
            max_delay: Duration::from_secs(5),
            ..Default::default()
        };
        assert_eq!(config.delay_for(10), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_three_failures_waits_full_schedule() {
        let executor = RetryExecutor::with_defaults();
        let calls = Arc::new(AtomicU32::new(0));
        let start = tokio::time::Instant::now();

        let result = executor
            .execute("test", || {
                let calls = calls.clone();
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 3 {
                        Err(server_error())
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(start.elapsed(), Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_last_error() {
        let executor = RetryExecutor::with_defaults();
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<(), _> = executor
            .execute("test", || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(server_error())
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(result.unwrap_err().status_code(), Some(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bad_request_is_attempted_once() {
        let executor = RetryExecutor::with_defaults();
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<(), _> = executor
            .execute("test", || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(GeminiError::Request(RequestError::BadRequest {
                        info: ApiErrorInfo::new(400, None, "bad"),
                        details: vec![],
                    }))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
