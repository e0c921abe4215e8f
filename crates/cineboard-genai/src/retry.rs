//! Retry with exponential backoff for flaky backend calls.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{GenAiError, GenAiResult};

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not including the initial attempt).
    pub max_retries: u32,
    /// Base delay for exponential backoff (doubles each attempt).
    pub base_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Operation name for logging.
    pub operation_name: String,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            operation_name: "backend call".to_string(),
        }
    }
}

impl RetryConfig {
    pub fn new(operation_name: impl Into<String>) -> Self {
        Self {
            operation_name: operation_name.into(),
            ..Default::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.base_delay.saturating_mul(2u32.saturating_pow(attempt));
        delay.min(self.max_delay)
    }
}

/// Runs `operation`, retrying transient failures with backoff. Permanent
/// failures (auth, validation, parse) return immediately.
pub async fn retry_async<F, Fut, T>(config: &RetryConfig, operation: F) -> GenAiResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = GenAiResult<T>>,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(
                        operation = config.operation_name.as_str(),
                        attempt, "succeeded after retry"
                    );
                }
                return Ok(value);
            }
            Err(e) if e.is_transient() && attempt < config.max_retries => {
                attempt += 1;
                let delay = config.delay_for_attempt(attempt);
                warn!(
                    operation = config.operation_name.as_str(),
                    attempt,
                    max_retries = config.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config() -> RetryConfig {
        RetryConfig::new("test").with_base_delay(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let calls = AtomicU32::new(0);
        let result: GenAiResult<u32> = retry_async(&fast_config(), || async {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(GenAiError::api(503, "upstream busy"))
            } else {
                Ok(7)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: GenAiResult<u32> = retry_async(&fast_config(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(GenAiError::api(401, "bad key"))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let calls = AtomicU32::new(0);
        let result: GenAiResult<u32> = retry_async(&fast_config(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(GenAiError::api(500, "still broken"))
        })
        .await;
        assert!(result.is_err());
        // initial attempt + 2 retries
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_delay_caps_at_max() {
        let config = RetryConfig::default();
        assert!(config.delay_for_attempt(30) <= config.max_delay);
    }
}
