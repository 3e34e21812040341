use thiserror::Error;

/// Failures talking to the similar-product text service.
///
/// A reply that arrives but cannot be parsed into similar products is not an
/// error; it degrades to zero results in the parser.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// Network or TLS failure. The request URL is stripped before wrapping so
    /// the API key never reaches logs or user-visible messages.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no API key configured for the enrichment service (set GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("invalid enrichment service URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("enrichment service rate limited the request (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("enrichment service returned HTTP {status}")]
    UnexpectedStatus { status: u16 },

    /// The HTTP exchange succeeded but the response envelope did not have
    /// the expected `candidates[0].content.parts[0].text` shape.
    #[error("malformed enrichment service response: {0}")]
    Envelope(String),
}
