//! Bounded retry for rate-limited operations.

use std::future::Future;
use std::time::Duration;

use sheets_connector::errors::SheetsApiError;
use tracing::{debug, warn};

use crate::errors::{Result, SheetError};

/// How an operation behaves when the remote service reports rate limiting.
///
/// An operation runs up to `max_attempts` times. After each of the first
/// `max_waits` failures the policy pauses for `wait` before the next
/// attempt; failures past that count retry immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub wait: Duration,
    pub max_waits: u32,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, wait: Duration, max_waits: u32) -> Self {
        Self {
            max_attempts,
            wait,
            max_waits,
        }
    }

    /// Whether a failed attempt (1-based) should pause before the next one.
    ///
    /// The final attempt never waits, there is no next attempt to wait for.
    pub fn should_wait(&self, attempt: u32) -> bool {
        attempt < self.max_attempts && attempt <= self.max_waits
    }
}

/// Policy for worksheet reads and row mutations.
pub const WORKSHEET_RETRY: RetryPolicy =
    RetryPolicy::new(30, Duration::from_secs(10), 20);

/// Policy for raw cell searches: fewer attempts with a much longer pause.
///
/// Kept separate from [`WORKSHEET_RETRY`] rather than unified; the search
/// path has always been throttled harder than row operations.
pub const CELL_SEARCH_RETRY: RetryPolicy =
    RetryPolicy::new(10, Duration::from_secs(100), 10);

/// Run `op` until it succeeds, a non-rate-limit error surfaces, or the
/// policy's attempt budget runs out.
///
/// Only rate-limit errors are retried. Anything else is assumed permanent
/// and returns immediately.
pub(crate) async fn retry<T, F, Fut>(
    policy: RetryPolicy,
    operation: &'static str,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SheetsApiError>>,
{
    let mut last_message = String::new();
    for attempt in 1..=policy.max_attempts {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation, attempt, "succeeded after retrying");
                }
                return Ok(value);
            }
            Err(err) if err.is_rate_limit() => {
                warn!(
                    operation,
                    attempt,
                    max_attempts = policy.max_attempts,
                    %err,
                    "rate limited",
                );
                last_message = err.to_string();
                if policy.should_wait(attempt) {
                    wait_with_countdown(policy.wait).await;
                }
            }
            Err(err) => return Err(SheetError::Api(err)),
        }
    }

    Err(SheetError::RetriesExhausted {
        operation,
        attempts: policy.max_attempts,
        message: last_message,
    })
}

/// Sleep for `wait`, logging remaining whole seconds as they pass.
async fn wait_with_countdown(wait: Duration) {
    let mut remaining = wait;
    while remaining >= Duration::from_secs(1) {
        debug!(seconds_left = remaining.as_secs(), "waiting before retrying");
        tokio::time::sleep(Duration::from_secs(1)).await;
        remaining -= Duration::from_secs(1);
    }
    if !remaining.is_zero() {
        tokio::time::sleep(remaining).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;

    use super::*;

    fn rate_limited() -> SheetsApiError {
        SheetsApiError::RateLimited {
            code: 429,
            message: "slow down".to_string(),
        }
    }

    fn server_error() -> SheetsApiError {
        SheetsApiError::ApiError {
            code: 500,
            status: "INTERNAL".to_string(),
            message: "boom".to_string(),
        }
    }

    const FAST: RetryPolicy = RetryPolicy::new(5, Duration::from_millis(2), 5);

    #[test]
    fn test_wait_schedule_shape() {
        assert!(WORKSHEET_RETRY.should_wait(1));
        assert!(WORKSHEET_RETRY.should_wait(20));
        assert!(!WORKSHEET_RETRY.should_wait(21));
        assert!(!WORKSHEET_RETRY.should_wait(30));

        // The wait cap matches the attempt budget here, but the final
        // attempt still never waits, leaving nine effective pauses.
        assert!(CELL_SEARCH_RETRY.should_wait(1));
        assert!(CELL_SEARCH_RETRY.should_wait(9));
        assert!(!CELL_SEARCH_RETRY.should_wait(10));
    }

    #[tokio::test]
    async fn test_retry_succeeds_after_rate_limits() {
        let calls = AtomicU32::new(0);
        let result = retry(FAST, "fetch rows", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { if n < 2 { Err(rate_limited()) } else { Ok(n) } }
        })
        .await
        .unwrap();

        assert_eq!(result, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_fails_fast_on_other_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = retry(FAST, "fetch rows", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(server_error()) }
        })
        .await;

        assert!(matches!(result, Err(SheetError::Api(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_exhausts_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = retry(FAST, "fetch rows", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(rate_limited()) }
        })
        .await;

        match result {
            Err(SheetError::RetriesExhausted {
                operation,
                attempts,
                ..
            }) => {
                assert_eq!(operation, "fetch rows");
                assert_eq!(attempts, 5);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_wait_cap_stops_pausing() {
        // Two failures wait, the remaining three retry immediately, so total
        // time stays near two wait periods.
        let policy = RetryPolicy::new(6, Duration::from_millis(50), 2);
        let started = Instant::now();
        let result: Result<()> =
            retry(policy, "fetch rows", || async { Err(rate_limited()) }).await;

        assert!(matches!(result, Err(SheetError::RetriesExhausted { .. })));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(100), "waited only {elapsed:?}");
        assert!(elapsed < Duration::from_millis(200), "waited too long: {elapsed:?}");
    }

    #[tokio::test]
    async fn test_no_wait_after_final_attempt() {
        let policy = RetryPolicy::new(1, Duration::from_secs(60), 5);
        let started = Instant::now();
        let result: Result<()> =
            retry(policy, "fetch rows", || async { Err(rate_limited()) }).await;

        assert!(matches!(result, Err(SheetError::RetriesExhausted { .. })));
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
