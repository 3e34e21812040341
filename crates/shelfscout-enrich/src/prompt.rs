//! Prompt text sent to the enrichment service.

/// Builds the instruction asking for three similar products as a bare JSON
/// array of `{url, website, description}` objects.
///
/// `exclude_site` names the retailer being scraped so its own listings are
/// not suggested back. Without it the prompt asks for sites other than the
/// product's original retailer.
#[must_use]
pub fn build_similar_products_prompt(product_name: &str, exclude_site: Option<&str>) -> String {
    let product_name = product_name.trim();
    let elsewhere = match exclude_site.map(str::trim).filter(|s| !s.is_empty()) {
        Some(site) => format!("other than {site}"),
        None => "other than the retailer it was originally listed on".to_owned(),
    };

    format!(
        r#"For the product "{product_name}":
  1. Find 3 similar products available on popular e-commerce websites {elsewhere}.
  2. If exact matches are not found, provide links to relevant category pages or search results for more general terms related to the product.
  3. For each result, provide:
     - The full URL of the product or category page
     - The name of the website (e.g., Amazon, ASOS, H&M)
     - A brief description of the product or category (max 10 words)

  Format the response as a JSON array of objects, each with 'url', 'website', and 'description' keys. Do not include any markdown formatting or extra text outside the JSON array."#
    )
}
