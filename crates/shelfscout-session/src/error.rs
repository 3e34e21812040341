use std::path::PathBuf;

use shelfscout_scraper::ScraperError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("too many records for one worksheet: {0}")]
    TooManyRows(usize),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to scrape page: {0}")]
    Scrape(#[from] ScraperError),

    #[error("row {row} is out of range ({total} products loaded)")]
    RowOutOfRange { row: usize, total: usize },

    #[error("row {row} is not on the current page ({page})")]
    RowNotOnPage { row: usize, page: usize },

    #[error("there are no scraped products to export")]
    NothingToExport,

    #[error(transparent)]
    Export(#[from] ExportError),
}
