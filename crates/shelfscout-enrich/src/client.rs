//! HTTP client for the Gemini `generateContent` endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use shelfscout_core::AppConfig;
use url::Url;

use crate::error::EnrichError;
use crate::retry::retry_with_backoff;
use crate::source::SimilarProductSource;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-pro";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

impl<'a> GenerateRequest<'a> {
    fn from_prompt(prompt: &'a str) -> Self {
        Self {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// `candidates[0].content.parts[0].text`
    fn into_first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .next()?
            .text
    }
}

/// Client for a Gemini-compatible text generation endpoint.
///
/// Use [`GeminiClient::from_config`] in production or
/// [`GeminiClient::with_base_url`] to point at a mock server in tests.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &"[redacted]")
            .field("endpoint", &self.endpoint.as_str())
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Creates a client for `model` on the production API.
    ///
    /// # Errors
    ///
    /// See [`GeminiClient::with_base_url`].
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, EnrichError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// - [`EnrichError::MissingApiKey`] if `api_key` is blank.
    /// - [`EnrichError::InvalidBaseUrl`] if `base_url`/`model` do not form a
    ///   valid URL.
    /// - [`EnrichError::Http`] if the underlying `reqwest::Client` cannot be
    ///   constructed.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, EnrichError> {
        if api_key.trim().is_empty() {
            return Err(EnrichError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("shelfscout/0.1 (product-listing)")
            .build()?;

        let raw = format!(
            "{}/v1beta/models/{}:generateContent",
            base_url.trim_end_matches('/'),
            model.trim()
        );
        let endpoint = Url::parse(&raw).map_err(|e| EnrichError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.trim().to_owned(),
            endpoint,
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    /// Builds a client from application config, including its retry policy.
    ///
    /// # Errors
    ///
    /// [`EnrichError::MissingApiKey`] when no key is configured, otherwise as
    /// [`GeminiClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, EnrichError> {
        let api_key = config
            .gemini_api_key
            .as_deref()
            .ok_or(EnrichError::MissingApiKey)?;
        Ok(Self::with_base_url(
            api_key,
            &config.gemini_model,
            config.request_timeout_secs,
            &config.gemini_base_url,
        )?
        .with_retry_policy(config.max_retries, config.retry_backoff_base_ms))
    }

    /// Retries transient failures up to `max_retries` additional times.
    #[must_use]
    pub fn with_retry_policy(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn request_once(&self, body: &GenerateRequest<'_>) -> Result<String, EnrichError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(redact)?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(EnrichError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            return Err(EnrichError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let raw = response.text().await.map_err(redact)?;
        let envelope: GenerateResponse =
            serde_json::from_str(&raw).map_err(|e| EnrichError::Envelope(e.to_string()))?;
        envelope
            .into_first_text()
            .ok_or_else(|| EnrichError::Envelope("response contained no candidate text".to_owned()))
    }
}

impl SimilarProductSource for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, EnrichError> {
        let body = GenerateRequest::from_prompt(prompt);
        let body = &body;
        let text =
            retry_with_backoff(self.max_retries, self.backoff_base_ms, || self.request_once(body))
                .await?;
        tracing::debug!(len = text.len(), "enrichment service replied");
        Ok(text)
    }
}

/// Drops the request URL (which carries the API key) from a transport error.
fn redact(err: reqwest::Error) -> EnrichError {
    EnrichError::Http(err.without_url())
}
