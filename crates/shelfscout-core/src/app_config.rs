use std::path::PathBuf;

/// CSS selectors the extractor uses to locate a product card and its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorConfig {
    pub card: String,
    pub name: String,
    pub price: String,
    pub image: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            card: ".product-grid-product".to_owned(),
            name: ".product-grid-product-info__name".to_owned(),
            price: ".price__amount".to_owned(),
            image: ".media-image__image".to_owned(),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub selectors: SelectorConfig,
    pub export_path: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("gemini_base_url", &self.gemini_base_url)
            .field("gemini_model", &self.gemini_model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("selectors", &self.selectors)
            .field("export_path", &self.export_path)
            .finish()
    }
}
