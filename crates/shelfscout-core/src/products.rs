use serde::{Deserialize, Serialize};
use url::Url;

use crate::CoreError;

/// Placeholder stored in [`ProductRecord::name`] when a card has no name element.
pub const NO_PRODUCT_NAME_FOUND: &str = "No Product Name Found";

/// Placeholder stored in [`ProductRecord::price`] when a card has no price element.
pub const NO_PRICE_FOUND: &str = "No Price Found";

/// One product card scraped from a listing page.
///
/// `name` and `price` are display strings exactly as the page rendered them
/// (trimmed); currency and locale formatting are opaque. The sentinel strings
/// [`NO_PRODUCT_NAME_FOUND`] and [`NO_PRICE_FOUND`] are ordinary values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub name: String,
    pub price: String,
    /// Absolute image URL, or `""` when the card has no usable image.
    pub image_url: String,
}

impl ProductRecord {
    /// Column headers in field order, used by the spreadsheet export.
    pub const FIELD_NAMES: [&'static str; 3] = ["name", "price", "imageUrl"];

    #[must_use]
    pub fn has_image(&self) -> bool {
        !self.image_url.is_empty()
    }

    /// Field values in the same order as [`Self::FIELD_NAMES`].
    #[must_use]
    pub fn fields(&self) -> [&str; 3] {
        [&self.name, &self.price, &self.image_url]
    }
}

/// An externally-sourced "similar product" link.
///
/// Only constructible through [`SimilarProduct::try_new`], which guarantees all
/// three fields are non-empty and `url` parses as a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimilarProduct {
    url: String,
    website: String,
    description: String,
}

impl SimilarProduct {
    /// Validates and builds a `SimilarProduct`. Values are trimmed first;
    /// whitespace-only counts as missing.
    ///
    /// # Errors
    ///
    /// - [`CoreError::MissingField`] if any field is empty after trimming.
    /// - [`CoreError::InvalidUrl`] if `url` does not parse.
    pub fn try_new(url: &str, website: &str, description: &str) -> Result<Self, CoreError> {
        let url = url.trim();
        let website = website.trim();
        let description = description.trim();

        if url.is_empty() {
            return Err(CoreError::MissingField("url"));
        }
        if website.is_empty() {
            return Err(CoreError::MissingField("website"));
        }
        if description.is_empty() {
            return Err(CoreError::MissingField("description"));
        }

        Url::parse(url).map_err(|e| CoreError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            url: url.to_owned(),
            website: website.to_owned(),
            description: description.to_owned(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn website(&self) -> &str {
        &self.website
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_record_serializes_with_camel_case_image_url() {
        let record = ProductRecord {
            name: "Linen Shirt".to_owned(),
            price: "29.95 EUR".to_owned(),
            image_url: "https://static.example.com/a.jpg".to_owned(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["imageUrl"], "https://static.example.com/a.jpg");
        assert_eq!(json["name"], "Linen Shirt");
    }

    #[test]
    fn product_record_fields_follow_header_order() {
        let record = ProductRecord {
            name: "n".to_owned(),
            price: "p".to_owned(),
            image_url: String::new(),
        };
        assert_eq!(record.fields(), ["n", "p", ""]);
        assert_eq!(ProductRecord::FIELD_NAMES, ["name", "price", "imageUrl"]);
        assert!(!record.has_image());
    }

    #[test]
    fn similar_product_accepts_valid_fields() {
        let p = SimilarProduct::try_new("https://a.com", "A", "d").unwrap();
        assert_eq!(p.url(), "https://a.com");
        assert_eq!(p.website(), "A");
        assert_eq!(p.description(), "d");
    }

    #[test]
    fn similar_product_trims_values() {
        let p = SimilarProduct::try_new("  https://a.com/x ", " ASOS ", " shirts\n").unwrap();
        assert_eq!(p.url(), "https://a.com/x");
        assert_eq!(p.website(), "ASOS");
        assert_eq!(p.description(), "shirts");
    }

    #[test]
    fn similar_product_rejects_each_missing_field() {
        assert!(matches!(
            SimilarProduct::try_new("", "A", "d"),
            Err(CoreError::MissingField("url"))
        ));
        assert!(matches!(
            SimilarProduct::try_new("https://a.com", "  ", "d"),
            Err(CoreError::MissingField("website"))
        ));
        assert!(matches!(
            SimilarProduct::try_new("https://a.com", "A", ""),
            Err(CoreError::MissingField("description"))
        ));
    }

    #[test]
    fn similar_product_rejects_invalid_url() {
        let err = SimilarProduct::try_new("not a url", "A", "d").unwrap_err();
        assert!(
            matches!(err, CoreError::InvalidUrl { ref url, .. } if url == "not a url"),
            "expected InvalidUrl, got: {err:?}"
        );
    }
}
