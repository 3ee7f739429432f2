//! Bounded exponential backoff for transient LLM provider failures.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::LlmError;

/// Status codes worth another attempt. Every other non-2xx is final.
pub const RETRYABLE_STATUSES: &[u16] = &[429, 500, 502, 503, 504];

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(400),
        }
    }
}

impl RetryPolicy {
    /// Delay after the `failed_attempt`-th failure (0-based): 400ms, 800ms, 1600ms...
    pub fn delay_for(&self, failed_attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(failed_attempt)
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// attempt budget is spent. The last error is returned as-is.
pub async fn with_backoff<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, LlmError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let mut attempt = 0;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                attempt += 1;
                if !e.is_retryable() || attempt >= policy.max_attempts {
                    return Err(e);
                }
                let delay = policy.delay_for(attempt - 1);
                warn!(
                    "LLM call attempt {}/{} failed ({e}), retrying after {}ms...",
                    attempt,
                    policy.max_attempts,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn api_error(status: u16) -> LlmError {
        LlmError::Api {
            status,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_delay_doubles_from_400ms() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_millis(400));
        assert_eq!(policy.delay_for(1), Duration::from_millis(800));
        assert_eq!(policy.delay_for(2), Duration::from_millis(1600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let result = with_backoff(&RetryPolicy::default(), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(api_error(503))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 400ms + 800ms of backoff on the paused clock
        assert_eq!(started.elapsed(), Duration::from_millis(1200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_exhausts_attempts() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = with_backoff(&RetryPolicy::default(), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(api_error(429)) }
        })
        .await;

        assert!(matches!(result, Err(LlmError::Api { status: 429, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let result: Result<(), _> = with_backoff(&RetryPolicy::default(), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(api_error(401)) }
        })
        .await;

        assert!(matches!(result, Err(LlmError::Api { status: 401, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_content_is_retried() {
        let calls = AtomicU32::new(0);

        let result = with_backoff(&RetryPolicy::default(), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err(LlmError::EmptyContent)
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_policy_never_sleeps() {
        let policy = RetryPolicy {
            max_attempts: 1,
            base_delay: Duration::from_secs(10),
        };
        let started = Instant::now();

        let result: Result<(), _> = with_backoff(&policy, |_| async { Err(api_error(500)) }).await;

        assert!(result.is_err());
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
