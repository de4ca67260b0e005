//! Retry with exponential backoff for oracle requests

use crate::http::error::HttpError;
use backoff::{backoff::Backoff, ExponentialBackoff};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt; 0 disables retrying
    pub max_retries: u32,
    pub base_delay_ms: u64,
    /// Upper bound for any single wait, including Retry-After
    pub max_delay_ms: u64,
    pub jitter: bool,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
            jitter: true,
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    pub fn none() -> Self {
        Self::new(0)
    }

    pub fn with_base_delay_ms(mut self, millis: u64) -> Self {
        self.base_delay_ms = millis;
        self
    }

    pub fn with_max_delay_ms(mut self, millis: u64) -> Self {
        self.max_delay_ms = millis;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    fn create_backoff(&self) -> ExponentialBackoff {
        let mut backoff = ExponentialBackoff {
            initial_interval: Duration::from_millis(self.base_delay_ms),
            max_interval: Duration::from_millis(self.max_delay_ms),
            multiplier: self.multiplier,
            // attempts are bounded by max_retries instead
            max_elapsed_time: None,
            ..Default::default()
        };

        if !self.jitter {
            backoff.randomization_factor = 0.0;
        }

        backoff
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry { delay: Duration },
    NoRetry,
}

/// Per-request retry state
#[derive(Debug)]
pub struct RetryHandler {
    policy: RetryPolicy,
    retries: u32,
    backoff: ExponentialBackoff,
}

impl RetryHandler {
    pub fn new(policy: RetryPolicy) -> Self {
        let backoff = policy.create_backoff();
        Self {
            policy,
            retries: 0,
            backoff,
        }
    }

    pub fn should_retry(&mut self, error: &HttpError) -> RetryDecision {
        if self.retries >= self.policy.max_retries || !error.should_retry() {
            return RetryDecision::NoRetry;
        }

        self.retries += 1;
        RetryDecision::Retry {
            delay: self.calculate_delay(error),
        }
    }

    fn calculate_delay(&mut self, error: &HttpError) -> Duration {
        let cap = Duration::from_millis(self.policy.max_delay_ms);

        // server hints take priority over the local schedule
        if let Some(hint) = error.retry_after.map(Duration::from_secs) {
            return hint.min(cap);
        }

        self.backoff
            .next_backoff()
            .map(|delay| delay.min(cap))
            .or_else(|| error.retry_delay_ms().map(Duration::from_millis))
            .unwrap_or(cap)
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }
}

/// Run `request_fn` until it succeeds or the policy gives up
pub async fn execute_with_retry<F, Fut, T>(
    mut request_fn: F,
    policy: RetryPolicy,
) -> Result<T, HttpError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, HttpError>>,
{
    let mut handler = RetryHandler::new(policy);

    loop {
        match request_fn().await {
            Ok(response) => return Ok(response),
            Err(error) => match handler.should_retry(&error) {
                RetryDecision::Retry { delay } => {
                    warn!(
                        attempt = handler.retries(),
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "oracle request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::NoRetry => {
                    debug!(retries = handler.retries(), error = %error, "giving up on oracle request");
                    return Err(error);
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::error::ErrorClassification;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn error(classification: ErrorClassification) -> HttpError {
        let mut error = HttpError::invalid_response("boom");
        error.classification = classification;
        error
    }

    #[test]
    fn test_max_retries() {
        let mut handler = RetryHandler::new(RetryPolicy::new(2).with_jitter(false));
        let server = error(ErrorClassification::ServerError);

        assert!(matches!(handler.should_retry(&server), RetryDecision::Retry { .. }));
        assert!(matches!(handler.should_retry(&server), RetryDecision::Retry { .. }));
        assert_eq!(handler.should_retry(&server), RetryDecision::NoRetry);
        assert_eq!(handler.retries(), 2);
    }

    #[test]
    fn test_non_retryable_errors() {
        let mut handler = RetryHandler::new(RetryPolicy::default());
        assert_eq!(
            handler.should_retry(&error(ErrorClassification::AuthenticationError)),
            RetryDecision::NoRetry
        );
        assert_eq!(
            handler.should_retry(&error(ErrorClassification::ClientError)),
            RetryDecision::NoRetry
        );
    }

    #[test]
    fn test_retry_after_is_capped() {
        let mut handler = RetryHandler::new(RetryPolicy::default().with_max_delay_ms(5_000));
        let mut limited = error(ErrorClassification::RateLimitError);
        limited.retry_after = Some(120);

        match handler.should_retry(&limited) {
            RetryDecision::Retry { delay } => assert_eq!(delay, Duration::from_secs(5)),
            RetryDecision::NoRetry => panic!("expected a retry"),
        }
    }

    #[tokio::test]
    async fn test_execute_with_retry_recovers() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3)
            .with_base_delay_ms(1)
            .with_max_delay_ms(2)
            .with_jitter(false);

        let result = execute_with_retry(
            || {
                let attempt = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 2 {
                        Err(error(ErrorClassification::NetworkError))
                    } else {
                        Ok("ok")
                    }
                }
            },
            policy,
        )
        .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_execute_without_retries_fails_fast() {
        let calls = AtomicU32::new(0);
        let result: Result<(), HttpError> = execute_with_retry(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(error(ErrorClassification::ServerError)) }
            },
            RetryPolicy::none(),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
