use crate::app_config::{AppConfig, SelectorConfig};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can pass a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Blank values are treated as unset so `.env` templates can leave keys empty.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let gemini_base_url = or_default(
        "SHELFSCOUT_GEMINI_BASE_URL",
        "https://generativelanguage.googleapis.com",
    );
    url::Url::parse(&gemini_base_url).map_err(|e| ConfigError::InvalidEnvVar {
        var: "SHELFSCOUT_GEMINI_BASE_URL".to_string(),
        reason: e.to_string(),
    })?;

    let defaults = SelectorConfig::default();
    let selectors = SelectorConfig {
        card: or_default("SHELFSCOUT_CARD_SELECTOR", &defaults.card),
        name: or_default("SHELFSCOUT_NAME_SELECTOR", &defaults.name),
        price: or_default("SHELFSCOUT_PRICE_SELECTOR", &defaults.price),
        image: or_default("SHELFSCOUT_IMAGE_SELECTOR", &defaults.image),
    };

    Ok(AppConfig {
        log_level: or_default("SHELFSCOUT_LOG_LEVEL", "info"),
        gemini_api_key: optional("GEMINI_API_KEY"),
        gemini_base_url: gemini_base_url.trim_end_matches('/').to_string(),
        gemini_model: or_default("SHELFSCOUT_GEMINI_MODEL", "gemini-pro"),
        request_timeout_secs: parse_u64("SHELFSCOUT_REQUEST_TIMEOUT_SECS", "30")?,
        user_agent: or_default("SHELFSCOUT_USER_AGENT", "shelfscout/0.1 (product-listing)"),
        max_retries: parse_u32("SHELFSCOUT_MAX_RETRIES", "2")?,
        retry_backoff_base_ms: parse_u64("SHELFSCOUT_RETRY_BACKOFF_BASE_MS", "500")?,
        selectors,
        export_path: PathBuf::from(or_default("SHELFSCOUT_EXPORT_PATH", "scraped_products.xlsx")),
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
