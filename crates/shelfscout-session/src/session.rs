//! One scrape session: the current record set, the active page, and the
//! per-row enrichment state layered on top.

use std::path::Path;

use shelfscout_core::ProductRecord;
use shelfscout_enrich::SimilarProductSource;
use shelfscout_scraper::RecordSource;

use crate::error::SessionError;
use crate::export::write_products_xlsx;
use crate::message::MessageSlot;
use crate::orchestrator::{EnrichmentOrchestrator, EnrichmentOutcome};
use crate::paginator::Paginator;
use crate::rows::RowState;

pub const NO_PRODUCTS_MESSAGE: &str = "No products found on this page.";

/// A record on the active page together with its enrichment state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRow {
    /// Global index into the full record set.
    pub index: usize,
    pub record: ProductRecord,
    /// `None` means never requested since the last reset.
    pub state: Option<RowState>,
}

/// Owned view of the active page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub page: usize,
    pub page_count: usize,
    pub total: usize,
    pub rows: Vec<PageRow>,
}

/// An enrichment request detached from the session so it can be spawned.
#[derive(Debug)]
pub struct PendingEnrichment<S> {
    orchestrator: EnrichmentOrchestrator<S>,
    product_name: String,
    row: usize,
}

impl<S: SimilarProductSource> PendingEnrichment<S> {
    #[must_use]
    pub fn row(&self) -> usize {
        self.row
    }

    #[must_use]
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub async fn run(self) -> EnrichmentOutcome {
        self.orchestrator
            .request_enrichment(&self.product_name, self.row)
            .await
    }
}

pub struct Session<T, S> {
    source: T,
    orchestrator: EnrichmentOrchestrator<S>,
    records: Vec<ProductRecord>,
    paginator: Paginator,
}

impl<T, S> std::fmt::Debug for Session<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("records", &self.records.len())
            .field("paginator", &self.paginator)
            .finish_non_exhaustive()
    }
}

impl<T: RecordSource, S: SimilarProductSource> Session<T, S> {
    /// Starts an empty session. Nothing is loaded until [`Session::scrape`].
    #[must_use]
    pub fn new(source: T, orchestrator: EnrichmentOrchestrator<S>) -> Self {
        Self {
            source,
            orchestrator,
            records: Vec::new(),
            paginator: Paginator::new(0),
        }
    }

    /// Fetches a fresh record set, replacing the old one.
    ///
    /// On success the page returns to 1 and every row's enrichment state is
    /// cleared. A transport failure leaves the previous records in place.
    /// Either way the message slot says what happened.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Scrape`] when the record source fails.
    pub async fn scrape(&mut self) -> Result<usize, SessionError> {
        let records = match self.source.fetch_records().await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "scrape failed");
                self.message().set(format!("Failed to scrape page: {e}")).await;
                return Err(e.into());
            }
        };

        let count = records.len();
        self.records = records;
        self.paginator.reset(count);
        self.orchestrator.reset_all().await;

        if count == 0 {
            self.message().set(NO_PRODUCTS_MESSAGE).await;
        } else {
            self.message().clear().await;
        }
        tracing::info!(count, pages = self.paginator.page_count(), "record set replaced");
        Ok(count)
    }

    /// Selects page `n` (clamped) and clears all enrichment state, even when
    /// the page does not actually change.
    pub async fn set_page(&mut self, n: usize) -> usize {
        let page = self.paginator.set_page(n);
        self.orchestrator.reset_all().await;
        tracing::debug!(requested = n, page, "page selected");
        page
    }

    pub async fn next_page(&mut self) -> usize {
        let next = self.paginator.page().saturating_add(1);
        self.set_page(next).await
    }

    pub async fn prev_page(&mut self) -> usize {
        let prev = self.paginator.page().saturating_sub(1);
        self.set_page(prev).await
    }

    #[must_use]
    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    #[must_use]
    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    #[must_use]
    pub fn message(&self) -> &MessageSlot {
        self.orchestrator.message()
    }

    #[must_use]
    pub fn orchestrator(&self) -> &EnrichmentOrchestrator<S> {
        &self.orchestrator
    }

    /// Records on the active page with their global indices and row states.
    pub async fn page_view(&self) -> PageView {
        let snapshot = self.orchestrator.snapshot().await;
        let range = self.paginator.range();
        let rows = self.records[range.clone()]
            .iter()
            .zip(range)
            .map(|(record, index)| PageRow {
                index,
                record: record.clone(),
                state: snapshot.get(&index).cloned(),
            })
            .collect();

        PageView {
            page: self.paginator.page(),
            page_count: self.paginator.page_count(),
            total: self.records.len(),
            rows,
        }
    }

    /// Prepares an enrichment request for a row on the active page. The
    /// returned value owns everything it needs and can be spawned.
    ///
    /// # Errors
    ///
    /// - [`SessionError::RowOutOfRange`] if `row` is not a loaded record.
    /// - [`SessionError::RowNotOnPage`] if `row` is not on the active page.
    pub fn prepare_enrichment(&self, row: usize) -> Result<PendingEnrichment<S>, SessionError> {
        let record = self.records.get(row).ok_or(SessionError::RowOutOfRange {
            row,
            total: self.records.len(),
        })?;
        if !self.paginator.range().contains(&row) {
            return Err(SessionError::RowNotOnPage {
                row,
                page: self.paginator.page(),
            });
        }
        Ok(PendingEnrichment {
            orchestrator: self.orchestrator.clone(),
            product_name: record.name.clone(),
            row,
        })
    }

    /// Runs enrichment for `row` to completion.
    ///
    /// # Errors
    ///
    /// See [`Session::prepare_enrichment`].
    pub async fn enrich_row(&self, row: usize) -> Result<EnrichmentOutcome, SessionError> {
        Ok(self.prepare_enrichment(row)?.run().await)
    }

    /// Exports every loaded record (not just the active page) to `path`.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NothingToExport`] if no records are loaded.
    /// - [`SessionError::Export`] if the workbook cannot be written.
    pub async fn export(&self, path: &Path) -> Result<usize, SessionError> {
        if self.records.is_empty() {
            return Err(SessionError::NothingToExport);
        }
        write_products_xlsx(&self.records, path).await?;
        Ok(self.records.len())
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
