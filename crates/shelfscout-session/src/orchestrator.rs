//! Per-row enrichment lifecycle.
//!
//! Each [`EnrichmentOrchestrator::request_enrichment`] call is independent:
//! several rows can be pending at once, and one row's failure never touches
//! another row. The row table lock is only held for the synchronous
//! transitions, never across the service call.

use std::collections::BTreeMap;
use std::sync::Arc;

use shelfscout_enrich::{find_similar_products, SimilarProductSource};
use tokio::sync::Mutex;

use crate::message::MessageSlot;
use crate::rows::{RowState, RowTable};

/// How a single enrichment request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    /// The row now holds this many similar products.
    Populated(usize),
    /// The service answered but nothing usable came back.
    Empty,
    /// The service call failed; the row is empty and the message was set.
    Failed(String),
    /// The row already had a request in flight; no new call was made.
    AlreadyPending,
    /// The rows were reset while the request was in flight; the late result
    /// was dropped.
    Discarded,
}

/// User-visible text for a failed enrichment request.
#[must_use]
pub fn enrichment_failure_message(error: &impl std::fmt::Display) -> String {
    format!("Failed to fetch similar products: {error}. Please try again.")
}

/// Cheap-to-clone handle over the shared row table.
pub struct EnrichmentOrchestrator<S> {
    source: Arc<S>,
    rows: Arc<Mutex<RowTable>>,
    message: MessageSlot,
    exclude_site: Option<Arc<str>>,
}

impl<S> Clone for EnrichmentOrchestrator<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            rows: Arc::clone(&self.rows),
            message: self.message.clone(),
            exclude_site: self.exclude_site.clone(),
        }
    }
}

impl<S> std::fmt::Debug for EnrichmentOrchestrator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrichmentOrchestrator")
            .field("exclude_site", &self.exclude_site)
            .finish_non_exhaustive()
    }
}

impl<S: SimilarProductSource> EnrichmentOrchestrator<S> {
    #[must_use]
    pub fn new(source: S, message: MessageSlot) -> Self {
        Self::from_shared(Arc::new(source), message)
    }

    #[must_use]
    pub fn from_shared(source: Arc<S>, message: MessageSlot) -> Self {
        Self {
            source,
            rows: Arc::new(Mutex::new(RowTable::new())),
            message,
            exclude_site: None,
        }
    }

    /// Names the retailer whose own listings should not be suggested.
    #[must_use]
    pub fn with_exclude_site(mut self, site: Option<&str>) -> Self {
        self.exclude_site = site.map(Arc::from);
        self
    }

    /// Fetches similar products for `product_name` into `row`.
    ///
    /// A row that is already pending is left alone and no service call is
    /// made. Starting a request clears the message slot; a failed request sets
    /// it and leaves the row empty.
    pub async fn request_enrichment(&self, product_name: &str, row: usize) -> EnrichmentOutcome {
        let Some(ticket) = self.rows.lock().await.begin(row) else {
            tracing::debug!(row, "enrichment already pending; ignoring trigger");
            return EnrichmentOutcome::AlreadyPending;
        };
        self.message.clear().await;
        tracing::info!(row, product = %product_name, "requesting similar products");

        let result =
            find_similar_products(&*self.source, product_name, self.exclude_site.as_deref()).await;

        let (products, failure) = match result {
            Ok(products) => (products, None),
            Err(e) => {
                tracing::warn!(row, error = %e, "similar product request failed");
                (Vec::new(), Some(enrichment_failure_message(&e)))
            }
        };
        let count = products.len();

        let mut rows = self.rows.lock().await;
        if !rows.complete(ticket, products) {
            drop(rows);
            tracing::debug!(
                row,
                generation = ticket.generation(),
                "discarding stale enrichment result"
            );
            return EnrichmentOutcome::Discarded;
        }
        drop(rows);

        if let Some(message) = failure {
            self.message.set(message.clone()).await;
            return EnrichmentOutcome::Failed(message);
        }

        tracing::info!(row, count, "similar products settled");
        if count == 0 {
            EnrichmentOutcome::Empty
        } else {
            EnrichmentOutcome::Populated(count)
        }
    }

    /// Clears every row back to absent. Responses still in flight will be
    /// discarded when they land.
    pub async fn reset_all(&self) {
        self.rows.lock().await.reset();
        tracing::debug!("enrichment state reset");
    }

    /// `None` means absent.
    pub async fn row_state(&self, row: usize) -> Option<RowState> {
        self.rows.lock().await.state(row).cloned()
    }

    pub async fn snapshot(&self) -> BTreeMap<usize, RowState> {
        self.rows.lock().await.snapshot()
    }

    #[must_use]
    pub fn message(&self) -> &MessageSlot {
        &self.message
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
