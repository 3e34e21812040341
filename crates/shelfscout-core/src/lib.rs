pub mod app_config;
pub mod config;
pub mod products;

use thiserror::Error;

pub use app_config::{AppConfig, SelectorConfig};
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{ProductRecord, SimilarProduct, NO_PRICE_FOUND, NO_PRODUCT_NAME_FOUND};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("similar product is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("similar product url \"{url}\" is not a valid URL: {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
