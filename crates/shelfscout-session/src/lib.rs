pub mod error;
pub mod export;
pub mod message;
pub mod orchestrator;
pub mod paginator;
pub mod rows;
pub mod session;

pub use error::{ExportError, SessionError};
pub use export::{export_products_xlsx, write_products_xlsx, SHEET_NAME};
pub use message::MessageSlot;
pub use orchestrator::{enrichment_failure_message, EnrichmentOrchestrator, EnrichmentOutcome};
pub use paginator::{page_count, page_range, page_slice, Paginator, PAGE_SIZE};
pub use rows::{EnrichmentTicket, RowState, RowTable};
pub use session::{PageRow, PageView, PendingEnrichment, Session, NO_PRODUCTS_MESSAGE};
