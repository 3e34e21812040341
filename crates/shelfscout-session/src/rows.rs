//! Per-row enrichment state.
//!
//! Rows are keyed by global index. A row that has never been requested (or
//! was cleared by a reset) is simply absent from the table. Every transition
//! goes through [`RowTable::begin`], [`RowTable::complete`] or
//! [`RowTable::reset`].

use std::collections::{BTreeMap, HashMap};

use shelfscout_core::SimilarProduct;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowState {
    /// A request is in flight.
    Pending,
    /// The last request finished with zero usable results (or failed).
    Empty,
    /// The last request finished with at least one result.
    Populated(Vec<SimilarProduct>),
}

impl RowState {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Proof that a row was moved to pending under a particular generation.
///
/// Completing with a ticket from an older generation is a no-op, so a response
/// that arrives after a reset cannot touch the current table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichmentTicket {
    row: usize,
    generation: u64,
}

impl EnrichmentTicket {
    #[must_use]
    pub fn row(&self) -> usize {
        self.row
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
pub struct RowTable {
    rows: HashMap<usize, RowState>,
    generation: u64,
}

impl RowTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves `row` to pending. Returns `None` if it is already pending.
    pub fn begin(&mut self, row: usize) -> Option<EnrichmentTicket> {
        if self.rows.get(&row).is_some_and(RowState::is_pending) {
            return None;
        }
        self.rows.insert(row, RowState::Pending);
        Some(EnrichmentTicket {
            row,
            generation: self.generation,
        })
    }

    /// Settles the row named by `ticket`: `Populated` for a non-empty list,
    /// `Empty` otherwise.
    ///
    /// Returns `false` (and changes nothing) when the ticket's generation is
    /// stale or the row is no longer pending.
    pub fn complete(&mut self, ticket: EnrichmentTicket, products: Vec<SimilarProduct>) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        match self.rows.get_mut(&ticket.row) {
            Some(state) if state.is_pending() => {
                *state = if products.is_empty() {
                    RowState::Empty
                } else {
                    RowState::Populated(products)
                };
                true
            }
            _ => false,
        }
    }

    /// Clears every row back to absent and invalidates outstanding tickets.
    pub fn reset(&mut self) {
        self.rows.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    /// `None` means absent.
    #[must_use]
    pub fn state(&self, row: usize) -> Option<&RowState> {
        self.rows.get(&row)
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.rows.values().filter(|s| s.is_pending()).count()
    }

    /// Owned copy of every non-absent row, ordered by row index.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<usize, RowState> {
        self.rows
            .iter()
            .map(|(row, state)| (*row, state.clone()))
            .collect()
    }
}
