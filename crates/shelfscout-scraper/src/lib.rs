pub mod client;
pub mod error;
pub mod extract;
mod retry;
pub mod source;

pub use client::PageFetcher;
pub use error::ScraperError;
pub use extract::{extract_products, page_origin, resolve_image_url, ProductSelectors};
pub use source::{PageScraper, PageTarget, RecordSource};
