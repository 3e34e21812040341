//! HTTP client for fetching rendered listing pages.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::error::ScraperError;
use crate::retry::retry_with_backoff;

/// Fetches listing page HTML.
///
/// Rate limiting (429), not-found (404) and other non-2xx responses become
/// typed errors. Transient failures (429, network errors, 5xx) are retried
/// with exponential backoff up to `max_retries` additional attempts.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay for exponential backoff: `backoff_base_ms * 2^attempt`.
    backoff_base_ms: u64,
}

impl PageFetcher {
    /// Creates a `PageFetcher` with configured timeout, `User-Agent`, and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Fetches the body of `url` as text.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`] if HTTP 429 persists after all retries exhausted.
    /// - [`ScraperError::NotFound`] on HTTP 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`] for any other non-2xx status (5xx retried, 4xx not).
    /// - [`ScraperError::Http`] for a network or TLS failure after all retries exhausted.
    pub async fn fetch_html(&self, url: &Url) -> Result<String, ScraperError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let response = self
                .client
                .get(url.clone())
                .header(
                    reqwest::header::ACCEPT,
                    "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
                )
                .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                .send()
                .await?;
            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after_secs = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(60);
                return Err(ScraperError::RateLimited {
                    domain: extract_domain(url),
                    retry_after_secs,
                });
            }

            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(ScraperError::NotFound {
                    url: url.to_string(),
                });
            }

            if !status.is_success() {
                return Err(ScraperError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            Ok(response.text().await?)
        })
        .await
    }
}

/// Hostname of `url` for error messages, falling back to the full URL.
fn extract_domain(url: &Url) -> String {
    url.host_str()
        .map_or_else(|| url.to_string(), str::to_owned)
}
