//! Plain-text rendering of pages and enrichment results.

use std::fmt::Write as _;

use shelfscout_session::{EnrichmentOutcome, PageRow, PageView, RowState};

pub(crate) const NO_IMAGE: &str = "No Image Available";
pub(crate) const SEARCHING: &str = "Searching...";
pub(crate) const NO_SIMILAR_PRODUCTS: &str =
    "No similar products found. Try searching for more general terms.";

pub(crate) fn render_page(view: &PageView) -> String {
    if view.total == 0 {
        return "No products loaded.\n".to_owned();
    }

    let mut out = format!(
        "Page {} of {} ({} products)\n",
        view.page, view.page_count, view.total
    );
    for row in &view.rows {
        render_row(&mut out, row);
    }
    out
}

fn render_row(out: &mut String, row: &PageRow) {
    let image = if row.record.has_image() {
        row.record.image_url.as_str()
    } else {
        NO_IMAGE
    };
    let _ = writeln!(
        out,
        "[{:>3}] {} | {} | {}",
        row.index, row.record.name, row.record.price, image
    );

    match &row.state {
        None => {}
        Some(RowState::Pending) => {
            let _ = writeln!(out, "      {SEARCHING}");
        }
        Some(RowState::Empty) => {
            let _ = writeln!(out, "      {NO_SIMILAR_PRODUCTS}");
        }
        Some(RowState::Populated(products)) => {
            for product in products {
                let _ = writeln!(
                    out,
                    "      - {}: {} ({})",
                    product.website(),
                    product.description(),
                    product.url()
                );
            }
        }
    }
}

pub(crate) fn render_outcome(row: usize, outcome: &EnrichmentOutcome) -> String {
    match outcome {
        EnrichmentOutcome::Populated(n) => format!("row {row}: {n} similar products found"),
        EnrichmentOutcome::Empty => format!("row {row}: {NO_SIMILAR_PRODUCTS}"),
        EnrichmentOutcome::Failed(message) => format!("row {row}: {message}"),
        EnrichmentOutcome::AlreadyPending => format!("row {row}: already searching"),
        EnrichmentOutcome::Discarded => {
            format!("row {row}: result arrived after the page changed and was dropped")
        }
    }
}

#[cfg(test)]
mod tests {
    use shelfscout_core::{ProductRecord, SimilarProduct};

    use super::*;

    fn row(index: usize, image_url: &str, state: Option<RowState>) -> PageRow {
        PageRow {
            index,
            record: ProductRecord {
                name: format!("Item {index}"),
                price: "9,95 EUR".to_owned(),
                image_url: image_url.to_owned(),
            },
            state,
        }
    }

    fn view(rows: Vec<PageRow>) -> PageView {
        PageView {
            page: 2,
            page_count: 3,
            total: 23,
            rows,
        }
    }

    #[test]
    fn empty_session_says_nothing_loaded() {
        let out = render_page(&PageView {
            page: 1,
            page_count: 0,
            total: 0,
            rows: Vec::new(),
        });
        assert_eq!(out, "No products loaded.\n");
    }

    #[test]
    fn renders_header_and_image_placeholder() {
        let out = render_page(&view(vec![
            row(10, "https://shop.example.com/a.jpg", None),
            row(11, "", None),
        ]));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Page 2 of 3 (23 products)");
        assert_eq!(
            lines[1],
            "[ 10] Item 10 | 9,95 EUR | https://shop.example.com/a.jpg"
        );
        assert_eq!(lines[2], "[ 11] Item 11 | 9,95 EUR | No Image Available");
    }

    #[test]
    fn renders_each_enrichment_state() {
        let product = SimilarProduct::try_new("https://a.com", "A", "d").unwrap();
        let out = render_page(&view(vec![
            row(10, "", Some(RowState::Pending)),
            row(11, "", Some(RowState::Empty)),
            row(12, "", Some(RowState::Populated(vec![product]))),
        ]));
        assert!(out.contains(&format!("      {SEARCHING}\n")));
        assert!(out.contains(&format!("      {NO_SIMILAR_PRODUCTS}\n")));
        assert!(out.contains("      - A: d (https://a.com)\n"));
    }

    #[test]
    fn renders_outcomes() {
        assert_eq!(
            render_outcome(3, &EnrichmentOutcome::Populated(2)),
            "row 3: 2 similar products found"
        );
        assert!(render_outcome(3, &EnrichmentOutcome::Empty).contains(NO_SIMILAR_PRODUCTS));
        assert_eq!(
            render_outcome(3, &EnrichmentOutcome::Failed("boom".to_owned())),
            "row 3: boom"
        );
    }
}
