//! Order sheet layout.
//!
//! The canonical layout is fully denormalized: row 0 holds the 13 column
//! names, then one row per line item, each repeating the order header
//! (serial, company, responsible, phone, dates, address) before the product
//! columns.
//!
//! The legacy layout is what the first form build read back: company,
//! responsible and phone in `A1..A3`, product rows from row 2 in the first six
//! columns. It is lossy and only decoded on request.

use super::sheet::{row_is_empty, CellValue, Sheet};
use crate::calc::line_sum_or_zero;
use crate::config::{COLUMN_COUNT, DEFAULT_DATE_FORMAT, SHEET_HEADERS};
use crate::error::{OrderError, Result};
use crate::model::{LineItem, OrderRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Layout to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SheetLayout {
    /// Header row plus one self-describing row per line.
    #[default]
    Denormalized,
    /// `A1..A3` header cells, product rows from row 2.
    Legacy,
}

impl SheetLayout {
    /// Decode `sheet` with this layout. Date cells are rendered with
    /// `date_format`.
    pub fn decode(&self, sheet: &Sheet, date_format: &str) -> Result<OrderRecord> {
        match self {
            SheetLayout::Denormalized => decode_with_date_format(sheet, date_format),
            SheetLayout::Legacy => Ok(decode_legacy(sheet)),
        }
    }
}

// Column indices.
const COL_SERIAL: usize = 0;
const COL_COMPANY: usize = 1;
const COL_RESPONSIBLE: usize = 2;
const COL_PHONE: usize = 3;
const COL_START: usize = 4;
const COL_END: usize = 5;
const COL_ADDRESS: usize = 6;
const COL_NAME: usize = 7;
const COL_UNIT: usize = 8;
const COL_QUANTITY: usize = 9;
const COL_PRICE: usize = 10;
const COL_SUM: usize = 11;
const COL_NOTE: usize = 12;

/// Build the data rows for `record`, one per line, tagged with `serials`.
pub fn data_rows(record: &OrderRecord, serials: &[String]) -> Result<Vec<Vec<CellValue>>> {
    if serials.len() != record.lines.len() {
        return Err(OrderError::SerialCountMismatch {
            expected: record.lines.len(),
            got: serials.len(),
        });
    }

    let rows = record
        .lines
        .iter()
        .zip(serials)
        .map(|(line, serial)| {
            let sum = line_sum_or_zero(&line.quantity, &line.price);
            vec![
                CellValue::text(serial.as_str()),
                CellValue::text(record.company.as_str()),
                CellValue::text(record.responsible.as_str()),
                CellValue::text(record.phone.as_str()),
                CellValue::text(record.start_date.as_str()),
                CellValue::text(record.end_date.as_str()),
                CellValue::text(record.address.as_str()),
                CellValue::text(line.name.as_str()),
                CellValue::text(line.unit.as_str()),
                CellValue::text(line.quantity.as_str()),
                CellValue::text(line.price.as_str()),
                CellValue::text(format!("{:.2}", sum)),
                CellValue::text(line.note.as_str()),
            ]
        })
        .collect();

    Ok(rows)
}

/// Encode `record` into the canonical layout.
pub fn encode(record: &OrderRecord, serials: &[String]) -> Result<Sheet> {
    let mut sheet = Sheet::with_header();
    for row in data_rows(record, serials)? {
        sheet.push_row(row);
    }
    Ok(sheet)
}

/// Check that row 0 of `sheet` is the canonical header.
pub(crate) fn check_header(sheet: &Sheet) -> Result<()> {
    let header = sheet.row(0).ok_or_else(|| OrderError::SheetLayoutMismatch {
        message: "sheet is empty, expected a header row".to_string(),
    })?;

    for (col, expected) in SHEET_HEADERS.iter().enumerate() {
        let found = sheet.text(0, col);
        if found.trim() != *expected {
            return Err(OrderError::SheetLayoutMismatch {
                message: format!(
                    "header column {} is '{}', expected '{}'",
                    col + 1,
                    found,
                    expected
                ),
            });
        }
    }

    if let Some(extra) = header[COLUMN_COUNT.min(header.len())..]
        .iter()
        .position(|cell| !cell.is_empty())
    {
        return Err(OrderError::SheetLayoutMismatch {
            message: format!("unexpected header column {}", COLUMN_COUNT + extra + 1),
        });
    }

    Ok(())
}

/// Decode a canonical order sheet.
///
/// Header fields come from the first data row; `serial_base` is that row's
/// serial. Sums are recomputed from quantity and price.
pub fn decode(sheet: &Sheet) -> Result<OrderRecord> {
    decode_with_date_format(sheet, DEFAULT_DATE_FORMAT)
}

/// [`decode`] with date cells rendered in `date_format`.
pub fn decode_with_date_format(sheet: &Sheet, date_format: &str) -> Result<OrderRecord> {
    check_header(sheet)?;

    let mut record = OrderRecord::default();
    let mut have_header = false;

    for (row_idx, row) in sheet.rows().iter().enumerate().skip(1) {
        if row_is_empty(row) {
            continue;
        }
        if let Some(extra) = row
            .iter()
            .skip(COLUMN_COUNT)
            .position(|cell| !cell.is_empty())
        {
            return Err(OrderError::SheetLayoutMismatch {
                message: format!(
                    "row {} has data in column {}, beyond the {} schema columns",
                    row_idx + 1,
                    COLUMN_COUNT + extra + 1,
                    COLUMN_COUNT
                ),
            });
        }

        let text = |col: usize| sheet.display(row_idx, col, date_format);

        if !have_header {
            record.serial_base = text(COL_SERIAL);
            record.company = text(COL_COMPANY);
            record.responsible = text(COL_RESPONSIBLE);
            record.phone = text(COL_PHONE);
            record.start_date = text(COL_START);
            record.end_date = text(COL_END);
            record.address = text(COL_ADDRESS);
            have_header = true;
        } else if text(COL_COMPANY) != record.company || text(COL_PHONE) != record.phone {
            warn!(
                "Row {}: order header differs from the first data row, keeping the first",
                row_idx + 1
            );
        }

        let line = LineItem::new(
            text(COL_NAME),
            text(COL_UNIT),
            text(COL_QUANTITY),
            text(COL_PRICE),
            text(COL_NOTE),
        );

        let stored_sum = text(COL_SUM);
        if !stored_sum.is_empty() && stored_sum != line.sum_text() {
            debug!(
                "Row {}: stored sum {} replaced by {}",
                row_idx + 1,
                stored_sum,
                line.sum_text()
            );
        }

        record.lines.push(line);
    }

    Ok(record)
}

/// Decode the legacy layout. Never fails; missing cells read as empty.
pub fn decode_legacy(sheet: &Sheet) -> OrderRecord {
    let mut record = OrderRecord {
        company: sheet.text(0, 0),
        responsible: sheet.text(1, 0),
        phone: sheet.text(2, 0),
        ..Default::default()
    };

    for (row_idx, row) in sheet.rows().iter().enumerate().skip(1) {
        if row.iter().take(6).all(CellValue::is_empty) {
            continue;
        }
        let text = |col: usize| sheet.text(row_idx, col);
        record.lines.push(LineItem::new(
            text(0),
            text(1),
            text(2),
            text(3),
            text(5),
        ));
    }

    record
}
