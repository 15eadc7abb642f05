//! Retry with exponential backoff for transient API failures.
//!
//! Network errors, timeouts, HTTP 429 and HTTP 5xx are retried; everything else
//! (404s, malformed bodies, GraphQL errors) propagates on the first attempt.

use crate::MetroError;
use std::future::Future;
use std::time::Duration;

/// Executes `operation`, retrying transient errors up to `max_retries`
/// additional times.
///
/// The wait before the n-th retry is `backoff_base_ms * 2^(n-1)` milliseconds.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, MetroError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, MetroError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !err.is_transient() || attempt >= max_retries {
            return Err(err);
        }

        let delay_ms = backoff_base_ms.saturating_mul(1u64 << attempt.min(20));
        tracing::warn!(
            attempt = attempt + 1,
            max_retries,
            delay_ms,
            error = %err,
            "Transient API error, retrying"
        );
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        attempt += 1;
    }
}
