//! Product card extraction from a rendered listing page.
//!
//! Cards are matched in document order and that order is load-bearing: a
//! record's position in the returned `Vec` is its global row index for the
//! rest of the session. A card missing any part still yields a record, with
//! the sentinel name/price or an empty image URL in place of the missing
//! piece.

use scraper::{ElementRef, Html, Selector};
use shelfscout_core::{ProductRecord, SelectorConfig, NO_PRICE_FOUND, NO_PRODUCT_NAME_FOUND};
use url::Url;

use crate::error::ScraperError;

/// Compiled form of a [`SelectorConfig`].
#[derive(Debug)]
pub struct ProductSelectors {
    card: Selector,
    name: Selector,
    price: Selector,
    image: Selector,
}

impl ProductSelectors {
    /// Compiles every selector in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] naming the first selector
    /// that fails to parse.
    pub fn compile(config: &SelectorConfig) -> Result<Self, ScraperError> {
        Ok(Self {
            card: compile_selector(&config.card)?,
            name: compile_selector(&config.name)?,
            price: compile_selector(&config.price)?,
            image: compile_selector(&config.image)?,
        })
    }
}

fn compile_selector(raw: &str) -> Result<Selector, ScraperError> {
    Selector::parse(raw).map_err(|e| ScraperError::InvalidSelector {
        selector: raw.to_owned(),
        reason: e.to_string(),
    })
}

/// Extracts one [`ProductRecord`] per matched product card, in document order.
///
/// `origin` qualifies relative image paths. When it is `None`, relative paths
/// cannot be resolved and become `""`. Returns an empty `Vec` when no card
/// matches.
#[must_use]
pub fn extract_products(
    html: &str,
    origin: Option<&Url>,
    selectors: &ProductSelectors,
) -> Vec<ProductRecord> {
    let document = Html::parse_document(html);

    let records: Vec<ProductRecord> = document
        .select(&selectors.card)
        .map(|card| {
            let record = ProductRecord {
                name: first_text(card, &selectors.name)
                    .unwrap_or_else(|| NO_PRODUCT_NAME_FOUND.to_owned()),
                price: first_text(card, &selectors.price)
                    .unwrap_or_else(|| NO_PRICE_FOUND.to_owned()),
                image_url: card
                    .select(&selectors.image)
                    .next()
                    .and_then(image_source)
                    .map(|raw| resolve_image_url(raw, origin))
                    .unwrap_or_default(),
            };
            tracing::debug!(
                name = %record.name,
                price = %record.price,
                image_url = %record.image_url,
                "extracted product card"
            );
            record
        })
        .collect();

    tracing::debug!(count = records.len(), "product card extraction finished");
    records
}

/// Trimmed text content of the first descendant matching `selector`.
/// Whitespace-only text counts as absent.
fn first_text(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let element = card.select(selector).next()?;
    let text = element.text().collect::<String>();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_owned())
    }
}

/// Direct `src` first, then the lazy-load `data-src` attribute.
fn image_source<'a>(image: ElementRef<'a>) -> Option<&'a str> {
    ["src", "data-src"]
        .into_iter()
        .filter_map(|attr| image.value().attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

/// Resolves `raw` to an absolute URL against `origin`. Never fails: anything
/// that cannot be resolved becomes `""`.
#[must_use]
pub fn resolve_image_url(raw: &str, origin: Option<&Url>) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    match Url::parse(raw) {
        Ok(absolute) => absolute.to_string(),
        Err(url::ParseError::RelativeUrlWithoutBase) => origin
            .and_then(|base| base.join(raw).ok())
            .map(String::from)
            .unwrap_or_default(),
        Err(e) => {
            tracing::debug!(raw, error = %e, "discarding unparseable image URL");
            String::new()
        }
    }
}

/// Reduces a page URL to its scheme+host(+port) origin, as a URL usable for
/// joining. Opaque origins (`file:`, `data:`) yield `None`.
#[must_use]
pub fn page_origin(page_url: &Url) -> Option<Url> {
    let origin = page_url.origin();
    if !origin.is_tuple() {
        return None;
    }
    Url::parse(&origin.ascii_serialization()).ok()
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
