//! Append-only database store.
//!
//! The store is an `.xlsx` file with the order sheet header. Appending reads
//! the current rows, writes them back unchanged and adds the new rows after
//! the last populated one. Dates, durations and formulas keep their type; a
//! bare error value cannot be written back, so such a store is refused.
//! There is a single attempt per call; a failure mid-write can leave the file
//! truncated unless atomic writes are enabled.

use crate::codec::{cell_name, data_rows, read_sheet, write_sheet, Sheet};
use crate::error::{OrderError, Result};
use crate::model::OrderRecord;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where an append landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Zero-based index of the first appended row.
    pub first_row: usize,
    /// Number of rows appended.
    pub rows_written: usize,
    /// Whether the store file was created by this call.
    pub created: bool,
}

/// Database store at a fixed path.
#[derive(Debug, Clone)]
pub struct DatabaseStore {
    path: PathBuf,
    atomic_writes: bool,
}

impl DatabaseStore {
    /// Open a store handle. The file is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            atomic_writes: false,
        }
    }

    /// Write through a temporary file and rename into place.
    pub fn with_atomic_writes(mut self, atomic: bool) -> Self {
        self.atomic_writes = atomic;
        self
    }

    /// Store path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the store file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the current sheet. A missing store reads as a header-only sheet.
    pub fn load(&self) -> Result<Sheet> {
        if !self.exists() {
            return Ok(Sheet::with_header());
        }
        let sheet = read_sheet(&self.path)?;
        crate::codec::check_header(&sheet)?;
        Ok(sheet)
    }

    /// Serial column of every data row.
    pub fn read_serials(&self) -> Result<Vec<String>> {
        let sheet = self.load()?;
        Ok((1..sheet.used_row_count())
            .map(|row| sheet.text(row, 0))
            .filter(|serial| !serial.is_empty())
            .collect())
    }

    /// Append one row per line of `record`, tagged with `serials`.
    pub fn append(&self, record: &OrderRecord, serials: &[String]) -> Result<AppendOutcome> {
        let rows = data_rows(record, serials)?;
        let created = !self.exists();

        let mut sheet = self.load()?;
        check_writable(&sheet)?;
        sheet.truncate_blank_rows();
        let first_row = sheet.row_count();
        let rows_written = rows.len();
        for row in rows {
            sheet.push_row(row);
        }

        write_sheet(&self.path, &sheet, self.atomic_writes)?;

        info!(
            "Appended {} row(s) to {} at row {}",
            rows_written,
            self.path.display(),
            first_row + 1
        );

        Ok(AppendOutcome {
            first_row,
            rows_written,
            created,
        })
    }
}

fn check_writable(sheet: &Sheet) -> Result<()> {
    match sheet.find_error() {
        Some((row, col, value)) => Err(OrderError::UnsupportedCell {
            cell: cell_name(row, col),
            value: value.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CellValue;
    use calamine::{open_workbook_auto, Data, Reader};
    use crate::model::LineItem;
    use pretty_assertions::assert_eq;

    fn record_with(lines: &[(&str, &str, &str)]) -> OrderRecord {
        let mut record = OrderRecord {
            serial_base: "2000".to_string(),
            company: "Caspian Build".to_string(),
            ..Default::default()
        };
        for (name, qty, price) in lines {
            record.add_line(LineItem::new(*name, "pcs", *qty, *price, ""));
        }
        record
    }

    fn serials(base: &str, n: usize) -> Vec<String> {
        crate::serial::SerialAllocator::default().allocate(base, n)
    }

    #[test]
    fn test_first_append_creates_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = DatabaseStore::new(dir.path().join("database.xlsx"));
        let record = record_with(&[("Panel", "3", "150.50"), ("Door", "1", "999.99")]);

        let outcome = store.append(&record, &serials("2000", 2)).unwrap();
        assert_eq!(
            outcome,
            AppendOutcome {
                first_row: 1,
                rows_written: 2,
                created: true
            }
        );

        let sheet = store.load().unwrap();
        assert_eq!(sheet.used_row_count(), 3);
        assert_eq!(sheet.text(1, 0), "2000");
        assert_eq!(sheet.text(2, 0), "2000-1");
    }

    #[test]
    fn test_second_append_leaves_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let store = DatabaseStore::new(dir.path().join("database.xlsx"));

        store
            .append(&record_with(&[("Panel", "3", "150.50")]), &serials("2000", 1))
            .unwrap();
        let before = store.load().unwrap();

        let outcome = store
            .append(
                &record_with(&[("Seal", "4", "2"), ("Frame", "1", "80")]),
                &serials("3000", 2),
            )
            .unwrap();
        assert_eq!(outcome.first_row, 2);
        assert!(!outcome.created);

        let after = store.load().unwrap();
        assert_eq!(after.used_row_count(), 4);
        assert_eq!(&after.rows()[..2], before.rows());
        assert_eq!(after.text(2, 0), "3000");
        assert_eq!(after.text(3, 7), "Frame");
    }

    #[test]
    fn test_append_empty_order_creates_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = DatabaseStore::new(dir.path().join("database.xlsx")).with_atomic_writes(true);

        let outcome = store.append(&record_with(&[]), &[]).unwrap();
        assert_eq!(outcome.rows_written, 0);
        assert!(store.exists());
        assert_eq!(store.load().unwrap().used_row_count(), 1);
    }

    #[test]
    fn test_read_serials() {
        let dir = tempfile::tempdir().unwrap();
        let store = DatabaseStore::new(dir.path().join("database.xlsx"));
        assert!(store.read_serials().unwrap().is_empty());

        let record = record_with(&[("Panel", "1", "1"), ("Door", "1", "1")]);
        store.append(&record, &serials("2000", 2)).unwrap();
        assert_eq!(store.read_serials().unwrap(), vec!["2000", "2000-1"]);
    }

    #[test]
    fn test_foreign_store_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.xlsx");
        let mut sheet = Sheet::new();
        sheet.set(0, 0, CellValue::text("Invoice"));
        write_sheet(&path, &sheet, false).unwrap();

        let store = DatabaseStore::new(&path);
        let err = store
            .append(&record_with(&[("Panel", "1", "1")]), &serials("1", 1))
            .unwrap_err();
        assert!(matches!(err, OrderError::SheetLayoutMismatch { .. }));
        assert_eq!(read_sheet(&path).unwrap(), sheet);
    }

    #[test]
    fn test_append_keeps_dates_and_formulas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.xlsx");
        let mut sheet = Sheet::with_header();
        sheet.push_row(vec![
            CellValue::text("2000"),
            CellValue::text("Caspian Build"),
            CellValue::Empty,
            CellValue::Empty,
            CellValue::DateTime(46082.0),
            CellValue::DateTime(46096.0),
            CellValue::Empty,
            CellValue::text("Panel"),
            CellValue::text("pcs"),
            CellValue::Number(3.0),
            CellValue::Number(150.5),
            CellValue::Formula {
                formula: "J2*K2".to_string(),
                result: Box::new(CellValue::Number(451.5)),
            },
            CellValue::text("tempered"),
        ]);
        write_sheet(&path, &sheet, false).unwrap();

        let store = DatabaseStore::new(&path);
        store
            .append(&record_with(&[("Door", "1", "999.99")]), &serials("3000", 1))
            .unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        let values = workbook.worksheet_range_at(0).unwrap().unwrap();
        assert!(matches!(values.get_value((1, 4)), Some(Data::DateTime(_))));
        let formulas = workbook.worksheet_formula("Sheet1").unwrap();
        let formula = formulas.get_value((1, 11)).map(String::as_str);
        assert_eq!(formula, Some("J2*K2"));

        let after = store.load().unwrap();
        assert_eq!(&after.rows()[..2], sheet.rows());
        assert_eq!(after.text(1, 4), "01.03.2026");
        assert_eq!(after.text(2, 0), "3000");
    }

    #[test]
    fn test_bare_error_value_blocks_append() {
        let mut sheet = Sheet::with_header();
        sheet.set(3, 4, CellValue::Error("#N/A".to_string()));

        let err = check_writable(&sheet).unwrap_err();
        assert!(matches!(
            err,
            OrderError::UnsupportedCell { ref cell, ref value } if cell == "E4" && value == "#N/A"
        ));
        assert_eq!(err.code(), crate::error::ErrorCode::SheetLayoutMismatch);
    }
}
