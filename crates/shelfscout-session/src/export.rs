//! Spreadsheet export of the full record set.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};
use shelfscout_core::ProductRecord;

use crate::error::ExportError;

pub const SHEET_NAME: &str = "Products";

/// Builds an xlsx workbook with a single `Products` sheet: a header row of
/// field names followed by one row per record, in record order.
///
/// # Errors
///
/// Returns [`ExportError`] if the workbook cannot be assembled.
pub fn export_products_xlsx(records: &[ProductRecord]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, name) in (0u16..).zip(ProductRecord::FIELD_NAMES) {
        sheet.write_string_with_format(0, col, name, &header)?;
    }
    for (index, record) in records.iter().enumerate() {
        let row = u32::try_from(index + 1).map_err(|_| ExportError::TooManyRows(records.len()))?;
        for (col, value) in (0u16..).zip(record.fields()) {
            sheet.write_string(row, col, value)?;
        }
    }
    sheet.set_column_width(0, 40)?;
    sheet.set_column_width(1, 16)?;
    sheet.set_column_width(2, 60)?;

    Ok(workbook.save_to_buffer()?)
}

/// Writes [`export_products_xlsx`] output to `path`.
///
/// # Errors
///
/// Returns [`ExportError::Write`] if the file cannot be written.
pub async fn write_products_xlsx(records: &[ProductRecord], path: &Path) -> Result<(), ExportError> {
    let bytes = export_products_xlsx(records)?;
    tokio::fs::write(path, &bytes)
        .await
        .map_err(|source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!(path = %path.display(), rows = records.len(), "exported products");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use calamine::{open_workbook_from_rs, Reader, Xlsx};

    use super::*;

    fn record(name: &str, price: &str, image_url: &str) -> ProductRecord {
        ProductRecord {
            name: name.to_owned(),
            price: price.to_owned(),
            image_url: image_url.to_owned(),
        }
    }

    fn read_back(bytes: Vec<u8>) -> (Vec<String>, Vec<Vec<String>>) {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        let names = workbook.sheet_names().clone();
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();
        let rows = range
            .rows()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect();
        (names, rows)
    }

    #[test]
    fn writes_header_and_rows_in_field_order() {
        let records = vec![
            record("Linen Shirt", "29,95 EUR", "https://shop.example.com/a.jpg"),
            record("Satin Dress", "49,95 EUR", "https://shop.example.com/b.jpg"),
        ];
        let (sheets, rows) = read_back(export_products_xlsx(&records).unwrap());

        assert_eq!(sheets, ["Products"]);
        assert_eq!(rows[0], ["name", "price", "imageUrl"]);
        assert_eq!(
            rows[1],
            ["Linen Shirt", "29,95 EUR", "https://shop.example.com/a.jpg"]
        );
        assert_eq!(rows[2][0], "Satin Dress");
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn sentinels_and_missing_images_are_exported_as_is() {
        let records = vec![record(
            shelfscout_core::NO_PRODUCT_NAME_FOUND,
            shelfscout_core::NO_PRICE_FOUND,
            "",
        )];
        let (_, rows) = read_back(export_products_xlsx(&records).unwrap());
        assert_eq!(rows[1][0], "No Product Name Found");
        assert_eq!(rows[1][1], "No Price Found");
        assert_eq!(rows[1].get(2).map(String::as_str).unwrap_or(""), "");
    }

    #[test]
    fn empty_record_set_still_has_header() {
        let (sheets, rows) = read_back(export_products_xlsx(&[]).unwrap());
        assert_eq!(sheets, ["Products"]);
        assert_eq!(rows, [["name", "price", "imageUrl"]]);
    }

    #[tokio::test]
    async fn writes_file_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scraped_products.xlsx");
        write_products_xlsx(&[record("A", "1", "")], &path).await.unwrap();
        let bytes = std::fs::read(&path).unwrap();
        let (_, rows) = read_back(bytes);
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn unwritable_path_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("out.xlsx");
        let err = write_products_xlsx(&[record("A", "1", "")], &path)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Write { .. }));
    }
}
