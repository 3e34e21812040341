//! Retry with exponential backoff for page fetches.
//!
//! Transient failures (429, network errors, 5xx) are retried; everything else
//! is propagated immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Returns `true` if `err` is worth retrying after a backoff delay.
///
/// Not retried: 404, other 4xx, invalid URLs, file I/O and selector errors.
fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } | ScraperError::Http(_) => true,
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        ScraperError::NotFound { .. }
        | ScraperError::InvalidPageUrl { .. }
        | ScraperError::ReadFile { .. }
        | ScraperError::InvalidSelector { .. } => false,
    }
}

/// Longest single wait between attempts, whatever `Retry-After` says.
const MAX_DELAY_MS: u64 = 30_000;

/// Wait before retry `attempt` (1-based): `backoff_base_ms * 2^(attempt-1)`,
/// or the server's `Retry-After` when that is longer. Capped at
/// [`MAX_DELAY_MS`].
fn retry_delay(err: &ScraperError, attempt: u32, backoff_base_ms: u64) -> Duration {
    let backoff = backoff_base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(62));
    let delay_ms = match err {
        ScraperError::RateLimited {
            retry_after_secs, ..
        } => backoff.max(retry_after_secs.saturating_mul(1000)),
        _ => backoff,
    };
    Duration::from_millis(delay_ms.min(MAX_DELAY_MS))
}

/// Executes `operation`, retrying transient errors up to `max_retries`
/// additional times with [`retry_delay`] between attempts.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if is_retriable(&err) && attempt < max_retries => err,
            Err(err) => return Err(err),
        };
        attempt += 1;

        let delay = retry_delay(&err, attempt, backoff_base_ms);
        tracing::warn!(
            attempt,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "transient page fetch error, retrying after backoff"
        );
        tokio::time::sleep(delay).await;
    }
}
