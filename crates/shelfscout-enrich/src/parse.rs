//! Resilient parsing of the enrichment service's free-text reply.
//!
//! The service is untrusted: the reply may be wrapped in markdown code fences,
//! surrounded by prose, truncated, or contain entries with missing or bogus
//! fields. Parsing never fails. Anything unusable degrades to fewer (or zero)
//! results.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use shelfscout_core::{CoreError, SimilarProduct};

static CODE_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*```(?:json)?\s*").expect("valid regex"));

/// Removes every ```` ```json ```` / ```` ``` ```` fence marker, together with
/// the whitespace around it, and trims the result.
#[must_use]
pub fn strip_code_fences(raw: &str) -> String {
    CODE_FENCE_RE.replace_all(raw, "").trim().to_owned()
}

/// Parses `raw` into validated [`SimilarProduct`]s, in reply order.
///
/// Entries missing `url`, `website` or `description`, carrying non-string or
/// blank values, or whose `url` does not parse are dropped individually.
/// A reply whose outer structure is not a JSON array yields an empty `Vec`.
#[must_use]
pub fn parse_similar_products(raw: &str) -> Vec<SimilarProduct> {
    let cleaned = strip_code_fences(raw);
    let Some(items) = parse_array(&cleaned) else {
        tracing::debug!(
            len = raw.len(),
            "enrichment reply is not a JSON array; treating as no results"
        );
        return Vec::new();
    };

    let total = items.len();
    let products: Vec<SimilarProduct> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match candidate(item) {
            Ok(product) => Some(product),
            Err(e) => {
                tracing::debug!(index, error = %e, "dropping similar product candidate");
                None
            }
        })
        .collect();

    tracing::debug!(
        total,
        admitted = products.len(),
        "parsed similar product candidates"
    );
    products
}

/// The whole text as a JSON array, else the outermost `[...]` span.
fn parse_array(text: &str) -> Option<Vec<Value>> {
    if let Ok(items) = serde_json::from_str::<Vec<Value>>(text) {
        return Some(items);
    }
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Vec<Value>>(&text[start..=end]).ok()
}

fn candidate(item: &Value) -> Result<SimilarProduct, CoreError> {
    let field = |name: &'static str| {
        item.get(name)
            .and_then(Value::as_str)
            .ok_or(CoreError::MissingField(name))
    };
    SimilarProduct::try_new(field("url")?, field("website")?, field("description")?)
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
