//! The enrichment backend the CLI hands to the session.

use shelfscout_core::AppConfig;
use shelfscout_enrich::{EnrichError, GeminiClient, SimilarProductSource};

/// Gemini when a key is configured. Without one, scraping and export still
/// work and every enrichment request fails with [`EnrichError::MissingApiKey`].
#[derive(Debug)]
pub(crate) enum Enricher {
    Gemini(GeminiClient),
    Unconfigured,
}

impl Enricher {
    pub(crate) fn from_config(config: &AppConfig) -> Result<Self, EnrichError> {
        match GeminiClient::from_config(config) {
            Ok(client) => Ok(Self::Gemini(client)),
            Err(EnrichError::MissingApiKey) => {
                tracing::warn!("GEMINI_API_KEY is not set; similar product search is disabled");
                Ok(Self::Unconfigured)
            }
            Err(e) => Err(e),
        }
    }
}

impl SimilarProductSource for Enricher {
    async fn generate(&self, prompt: &str) -> Result<String, EnrichError> {
        match self {
            Self::Gemini(client) => client.generate(prompt).await,
            Self::Unconfigured => Err(EnrichError::MissingApiKey),
        }
    }
}
