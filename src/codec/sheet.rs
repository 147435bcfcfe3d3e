//! In-memory tabular sheet.

use crate::config::{DEFAULT_DATE_FORMAT, SHEET_HEADERS};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::fmt::Write;

/// One cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Excel serial date/time.
    DateTime(f64),
    /// Excel serial duration, in days.
    Duration(f64),
    /// Error value such as `#N/A`.
    Error(String),
    /// Formula text (without `=`) and its cached result.
    Formula {
        formula: String,
        result: Box<CellValue>,
    },
}

impl CellValue {
    /// Create a text cell. Empty text becomes [`CellValue::Empty`].
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value)
        }
    }

    /// Check if the cell holds nothing visible.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Cell contents as display text, dates in the form's date format.
    pub fn as_text(&self) -> String {
        self.display(DEFAULT_DATE_FORMAT)
    }

    /// Cell contents as display text.
    ///
    /// Whole numbers print without a fraction. Dates are formatted with
    /// `date_format` (chrono syntax); formulas show their cached result.
    pub fn display(&self, date_format: &str) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) | CellValue::Error(s) => s.clone(),
            CellValue::Number(n) | CellValue::Duration(n) => number_text(*n),
            CellValue::Bool(b) => b.to_string(),
            CellValue::DateTime(serial) => serial_to_datetime(*serial)
                .and_then(|dt| {
                    let mut out = String::new();
                    write!(out, "{}", dt.format(date_format)).ok().map(|_| out)
                })
                .unwrap_or_else(|| number_text(*serial)),
            CellValue::Formula { result, .. } => result.display(date_format),
        }
    }
}

fn number_text(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Convert an Excel serial (days since 1899-12-30) to a date/time.
///
/// Serials before 1900-03-01 come out one day early (the 1900 leap day
/// does not exist).
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let millis = (serial * 86_400_000.0).round();
    if !millis.is_finite() || millis.abs() > 1e15 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    epoch.checked_add_signed(TimeDelta::try_milliseconds(millis as i64)?)
}

/// Rows of cells, zero-based. Row 0 is the header row in order sheets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Create an empty sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sheet holding only the order header row.
    pub fn with_header() -> Self {
        let mut sheet = Self::new();
        sheet.push_row(SHEET_HEADERS.iter().map(|h| CellValue::text(*h)).collect());
        sheet
    }

    /// Create a sheet from text rows.
    pub fn from_text_rows<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|v| CellValue::text(v)).collect())
                .collect(),
        }
    }

    /// All rows.
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Row at `index`, if present.
    pub fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Number of stored rows, including trailing blank ones.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of rows up to and including the last populated one.
    pub fn used_row_count(&self) -> usize {
        self.rows
            .iter()
            .rposition(|row| !row_is_empty(row))
            .map_or(0, |idx| idx + 1)
    }

    /// Cell at `(row, col)`; missing cells read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.rows.get(row).and_then(|r| r.get(col)).unwrap_or(EMPTY)
    }

    /// Text of the cell at `(row, col)`.
    pub fn text(&self, row: usize, col: usize) -> String {
        self.cell(row, col).as_text()
    }

    /// Text of the cell at `(row, col)`, dates formatted with `date_format`.
    pub fn display(&self, row: usize, col: usize, date_format: &str) -> String {
        self.cell(row, col).display(date_format)
    }

    /// First error value that is not a formula result, as `(row, col, text)`.
    pub fn find_error(&self) -> Option<(usize, usize, &str)> {
        self.rows.iter().enumerate().find_map(|(row, cells)| {
            cells.iter().enumerate().find_map(|(col, cell)| match cell {
                CellValue::Error(text) => Some((row, col, text.as_str())),
                _ => None,
            })
        })
    }

    /// Set a cell, growing the sheet as needed.
    pub fn set(&mut self, row: usize, col: usize, value: CellValue) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, CellValue::Empty);
        }
        cells[col] = value;
    }

    /// Append a row after the last stored row.
    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    /// Drop trailing blank rows.
    pub fn truncate_blank_rows(&mut self) {
        let used = self.used_row_count();
        self.rows.truncate(used);
    }
}

/// A1-style name of the cell at zero-based `(row, col)`.
pub fn cell_name(row: usize, col: usize) -> String {
    let mut letters = Vec::new();
    let mut n = col + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    format!("{}{}", String::from_utf8_lossy(&letters), row + 1)
}

/// Check if every cell in `row` is empty.
pub fn row_is_empty(row: &[CellValue]) -> bool {
    row.iter().all(CellValue::is_empty)
}
