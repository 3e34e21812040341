//! The scrape transport: "run extraction against the page, hand back records
//! or a transport failure".

use std::future::Future;
use std::path::PathBuf;

use shelfscout_core::{AppConfig, ProductRecord, SelectorConfig};
use url::Url;

use crate::client::PageFetcher;
use crate::error::ScraperError;
use crate::extract::{extract_products, page_origin, ProductSelectors};

/// Anything that can produce a fresh product record set.
///
/// Resolves exactly once: either the full ordered record set (possibly empty)
/// or a transport-level failure.
pub trait RecordSource {
    fn fetch_records(
        &self,
    ) -> impl Future<Output = Result<Vec<ProductRecord>, ScraperError>> + Send;
}

/// Where the listing page comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageTarget {
    /// A live page fetched over HTTP(S).
    Url(Url),
    /// A saved HTML document. `origin` qualifies relative image paths.
    File { path: PathBuf, origin: Option<Url> },
}

impl PageTarget {
    /// Parses a live page URL. Only `http` and `https` are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidPageUrl`] if `raw` does not parse or
    /// uses another scheme.
    pub fn parse_url(raw: &str) -> Result<Self, ScraperError> {
        let url = Url::parse(raw.trim()).map_err(|e| ScraperError::InvalidPageUrl {
            url: raw.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ScraperError::InvalidPageUrl {
                url: raw.to_owned(),
                reason: format!("unsupported scheme \"{}\"", url.scheme()),
            });
        }
        Ok(Self::Url(url))
    }

    /// A saved HTML file, with an optional origin URL for image resolution.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidPageUrl`] if `origin` is given but does
    /// not parse.
    pub fn file(path: impl Into<PathBuf>, origin: Option<&str>) -> Result<Self, ScraperError> {
        let origin = origin
            .map(|raw| {
                Url::parse(raw.trim()).map_err(|e| ScraperError::InvalidPageUrl {
                    url: raw.to_owned(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;
        Ok(Self::File {
            path: path.into(),
            origin,
        })
    }

    /// Origin used to absolutize relative image paths.
    #[must_use]
    pub fn origin(&self) -> Option<Url> {
        match self {
            Self::Url(url) => page_origin(url),
            Self::File { origin, .. } => origin.as_ref().and_then(page_origin),
        }
    }

    /// Host of the retailer being scraped, when known.
    #[must_use]
    pub fn host(&self) -> Option<String> {
        match self {
            Self::Url(url) => url.host_str().map(str::to_owned),
            Self::File { origin, .. } => origin
                .as_ref()
                .and_then(|o| o.host_str().map(str::to_owned)),
        }
    }
}

impl std::fmt::Display for PageTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::File { path, .. } => write!(f, "{}", path.display()),
        }
    }
}

/// [`RecordSource`] that loads a [`PageTarget`] and runs the extractor on it.
#[derive(Debug, Clone)]
pub struct PageScraper {
    fetcher: PageFetcher,
    target: PageTarget,
    selectors: SelectorConfig,
}

impl PageScraper {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if any selector in
    /// `selectors` does not compile.
    pub fn new(
        fetcher: PageFetcher,
        target: PageTarget,
        selectors: SelectorConfig,
    ) -> Result<Self, ScraperError> {
        ProductSelectors::compile(&selectors)?;
        Ok(Self {
            fetcher,
            target,
            selectors,
        })
    }

    /// Builds the fetcher and selector set from application config.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the HTTP client cannot be built or a
    /// configured selector is invalid.
    pub fn from_config(config: &AppConfig, target: PageTarget) -> Result<Self, ScraperError> {
        let fetcher = PageFetcher::new(
            config.request_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_ms,
        )?;
        Self::new(fetcher, target, config.selectors.clone())
    }

    #[must_use]
    pub fn target(&self) -> &PageTarget {
        &self.target
    }

    async fn load_html(&self) -> Result<String, ScraperError> {
        match &self.target {
            PageTarget::Url(url) => self.fetcher.fetch_html(url).await,
            PageTarget::File { path, .. } => tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ScraperError::ReadFile {
                    path: path.clone(),
                    source,
                }),
        }
    }
}

impl RecordSource for PageScraper {
    async fn fetch_records(&self) -> Result<Vec<ProductRecord>, ScraperError> {
        let html = self.load_html().await?;
        let origin = self.target.origin();
        let records = {
            let selectors = ProductSelectors::compile(&self.selectors)?;
            extract_products(&html, origin.as_ref(), &selectors)
        };
        tracing::info!(
            page = %self.target,
            count = records.len(),
            "scraped product listing"
        );
        Ok(records)
    }
}
