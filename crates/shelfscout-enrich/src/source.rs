use std::future::Future;

use shelfscout_core::SimilarProduct;

use crate::error::EnrichError;
use crate::parse::parse_similar_products;
use crate::prompt::build_similar_products_prompt;

/// A black-box text generator: prompt in, free text out.
///
/// Implementations report transport failures (network, non-2xx, malformed
/// envelope) as errors. Whatever text comes back is returned verbatim; the
/// caller is responsible for parsing it.
pub trait SimilarProductSource: Send + Sync {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, EnrichError>> + Send;
}

/// Asks `source` for products similar to `product_name` and parses the reply.
///
/// # Errors
///
/// Propagates the [`EnrichError`] from `source`. A reply that cannot be
/// parsed is not an error; it yields an empty `Vec`.
pub async fn find_similar_products<S: SimilarProductSource>(
    source: &S,
    product_name: &str,
    exclude_site: Option<&str>,
) -> Result<Vec<SimilarProduct>, EnrichError> {
    let prompt = build_similar_products_prompt(product_name, exclude_site);
    let reply = source.generate(&prompt).await?;
    Ok(parse_similar_products(&reply))
}
