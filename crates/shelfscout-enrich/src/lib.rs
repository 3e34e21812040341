pub mod client;
pub mod error;
pub mod parse;
pub mod prompt;
mod retry;
pub mod source;

pub use client::GeminiClient;
pub use error::EnrichError;
pub use parse::{parse_similar_products, strip_code_fences};
pub use prompt::build_similar_products_prompt;
pub use source::{find_similar_products, SimilarProductSource};
