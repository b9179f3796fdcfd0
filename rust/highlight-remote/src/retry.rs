//! Exponential backoff around a single recognition attempt.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::RecognitionError;

/// How often, and how patiently, a failed attempt is retried.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one (default: 3)
    pub max_attempts: u32,

    /// Delay before the second attempt; doubles for every attempt after
    /// that (default: 1s)
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// A policy that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// The pause after failed attempt `attempt` (1-based) and before the next
    /// one: `base_delay * 2^(attempt - 1)`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Run `attempt` until it succeeds, fails terminally, or the attempt
    /// budget is spent.
    ///
    /// The closure receives the 1-based attempt number. `cancel` is observed
    /// while an attempt is in flight and during every backoff pause; once it
    /// fires the call resolves to [RecognitionError::Cancelled] and no
    /// further attempts are made.
    pub async fn run<F, Fut, T>(
        &self,
        cancel: &CancellationToken,
        mut attempt: F,
    ) -> Result<T, RecognitionError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, RecognitionError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut number = 1;

        loop {
            if cancel.is_cancelled() {
                return Err(RecognitionError::Cancelled);
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(RecognitionError::Cancelled),
                result = attempt(number) => result,
            };

            let error = match result {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if !error.is_retryable() {
                debug!(attempt = number, %error, "Recognition attempt failed terminally");
                return Err(error);
            }

            if number >= max_attempts {
                warn!(attempts = number, %error, "Recognition retries exhausted");
                return Err(error);
            }

            let delay = self.delay_after(number);
            debug!(
                attempt = number,
                delay_ms = delay.as_millis() as u64,
                %error,
                "Retrying recognition"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RecognitionError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }

            number += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[test]
    fn it_doubles_the_delay() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.delay_after(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_after(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_after(3), Duration::from_millis(4000));
        assert_eq!(policy.delay_after(64), Duration::from_millis(1000) * u32::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn it_exhausts_retryable_failures() {
        let policy = RetryPolicy::default();
        let calls = Arc::new(AtomicU32::new(0));
        let started = Instant::now();

        let result: Result<(), _> = policy
            .run(&CancellationToken::new(), |_| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(RecognitionError::from_status(503, "unavailable"))
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.unwrap_err().status(), Some(503));
        assert_eq!(started.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn it_stops_on_terminal_failures() {
        let policy = RetryPolicy::default();
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<(), _> = policy
            .run(&CancellationToken::new(), |_| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(RecognitionError::from_status(404, "not found"))
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(RecognitionError::Client { status: 404, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn it_recovers_after_a_transient_failure() {
        let policy = RetryPolicy::default();

        let result = policy
            .run(&CancellationToken::new(), |attempt| async move {
                if attempt == 1 {
                    Err(RecognitionError::timeout("timed out"))
                } else {
                    Ok(attempt)
                }
            })
            .await;

        assert_eq!(result, Ok(2));
    }

    #[tokio::test(start_paused = true)]
    async fn it_abandons_backoff_when_cancelled() {
        let policy = RetryPolicy::default();
        let cancel = CancellationToken::new();
        let calls = Arc::new(AtomicU32::new(0));

        let task = {
            let cancel = cancel.clone();
            let calls = calls.clone();
            tokio::spawn(async move {
                policy
                    .run(&cancel, |_| {
                        let calls = calls.clone();
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            Err::<(), _>(RecognitionError::from_status(500, "boom"))
                        }
                    })
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(500)).await;
        cancel.cancel();

        let result = task.await.unwrap();
        assert_eq!(result, Err(RecognitionError::Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
