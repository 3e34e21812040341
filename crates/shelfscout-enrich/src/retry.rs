//! Retry with exponential back-off and jitter for enrichment requests.

use std::future::Future;
use std::time::Duration;

use crate::error::EnrichError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// Retriable: timeouts, connection failures, 429 and 5xx. Everything else
/// (missing key, 4xx, malformed envelope) is a hard stop.
pub(crate) fn is_retriable(err: &EnrichError) -> bool {
    match err {
        EnrichError::Http(e) => e.is_timeout() || e.is_connect(),
        EnrichError::RateLimited { .. } => true,
        EnrichError::UnexpectedStatus { status } => *status >= 500,
        EnrichError::MissingApiKey
        | EnrichError::InvalidBaseUrl { .. }
        | EnrichError::Envelope(_) => false,
    }
}

/// Longest single wait between attempts, whatever the service asks for.
const MAX_DELAY_MS: u64 = 30_000;

/// Wait before retry `attempt` (1-based): `backoff_base_ms * 2^(attempt-1)`
/// scaled by a random factor in `[0.75, 1.25)`. A rate-limited reply waits at
/// least its `Retry-After`. Never longer than [`MAX_DELAY_MS`].
fn retry_delay(err: &EnrichError, attempt: u32, backoff_base_ms: u64) -> Duration {
    let backoff = backoff_base_ms
        .saturating_mul(1u64 << attempt.saturating_sub(1).min(10))
        .min(MAX_DELAY_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (backoff as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
    let floor_ms = match err {
        EnrichError::RateLimited { retry_after_secs } => retry_after_secs.saturating_mul(1000),
        _ => 0,
    };
    Duration::from_millis(jittered.max(floor_ms).min(MAX_DELAY_MS))
}

/// Runs `operation` with up to `max_retries` additional attempts on transient
/// errors, sleeping [`retry_delay`] between attempts.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, EnrichError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EnrichError>>,
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
            "enrichment service transient error, retrying after back-off"
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn hard_failures_are_not_retriable() {
        assert!(!is_retriable(&EnrichError::MissingApiKey));
        assert!(!is_retriable(&EnrichError::Envelope("bad".to_owned())));
        assert!(!is_retriable(&EnrichError::UnexpectedStatus { status: 400 }));
    }

    #[test]
    fn rate_limits_and_server_errors_are_retriable() {
        assert!(is_retriable(&EnrichError::RateLimited {
            retry_after_secs: 1
        }));
        assert!(is_retriable(&EnrichError::UnexpectedStatus { status: 502 }));
    }

    #[test]
    fn backoff_doubles_within_jitter_band() {
        let err = EnrichError::UnexpectedStatus { status: 503 };
        let first = retry_delay(&err, 1, 100).as_millis();
        let third = retry_delay(&err, 3, 100).as_millis();
        assert!((75..125).contains(&first), "first delay {first}ms");
        assert!((300..500).contains(&third), "third delay {third}ms");
    }

    #[test]
    fn rate_limited_delay_waits_for_retry_after() {
        let err = EnrichError::RateLimited {
            retry_after_secs: 3,
        };
        let delay = retry_delay(&err, 1, 10);
        assert!(delay >= Duration::from_secs(3), "waited only {delay:?}");
        assert!(delay < Duration::from_millis(3_100));
    }

    #[test]
    fn rate_limited_delay_is_capped() {
        let err = EnrichError::RateLimited {
            retry_after_secs: 3_600,
        };
        assert_eq!(
            retry_delay(&err, 1, 10),
            Duration::from_millis(MAX_DELAY_MS)
        );
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(EnrichError::UnexpectedStatus { status: 503 })
                } else {
                    Ok::<&str, EnrichError>("[]")
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), "[]");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(EnrichError::RateLimited {
                    retry_after_secs: 0,
                })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(result, Err(EnrichError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn does_not_retry_malformed_envelope() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(EnrichError::Envelope("no candidates".to_owned()))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(EnrichError::Envelope(_))));
    }
}
