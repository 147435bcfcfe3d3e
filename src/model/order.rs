//! Order record: client/job header plus product lines.

use super::LineItem;
use crate::config::DEFAULT_SERIAL;
use crate::error::{OrderError, Result};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// One client/job entry with its product lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderRecord {
    /// Operator-entered base serial. Empty means [`DEFAULT_SERIAL`].
    pub serial_base: String,
    /// Client company.
    pub company: String,
    /// Responsible person.
    pub responsible: String,
    /// Contact phone, stored as typed.
    pub phone: String,
    /// Start date display text.
    pub start_date: String,
    /// End date display text. May precede the start date.
    pub end_date: String,
    /// Site address.
    pub address: String,
    /// Product lines in row order.
    pub lines: Vec<LineItem>,
}

impl OrderRecord {
    /// Create an empty record with both dates set to today.
    pub fn new(date_format: &str) -> Self {
        let today = Local::now().date_naive().format(date_format).to_string();
        Self {
            start_date: today.clone(),
            end_date: today,
            ..Default::default()
        }
    }

    /// Base serial with the default applied.
    pub fn effective_serial_base(&self) -> &str {
        let trimmed = self.serial_base.trim();
        if trimmed.is_empty() {
            DEFAULT_SERIAL
        } else {
            trimmed
        }
    }

    /// Append a line and return its index.
    pub fn add_line(&mut self, mut line: LineItem) -> usize {
        line.recompute();
        self.lines.push(line);
        self.lines.len() - 1
    }

    /// Remove the line at `index`.
    pub fn remove_line(&mut self, index: usize) -> Result<LineItem> {
        if index >= self.lines.len() {
            return Err(OrderError::LineIndexOutOfRange {
                index,
                len: self.lines.len(),
            });
        }
        Ok(self.lines.remove(index))
    }

    /// Mutable access to the line at `index`.
    pub fn line_mut(&mut self, index: usize) -> Result<&mut LineItem> {
        let len = self.lines.len();
        self.lines
            .get_mut(index)
            .ok_or(OrderError::LineIndexOutOfRange { index, len })
    }

    /// Recompute every line sum.
    pub fn recompute_sums(&mut self) {
        for line in &mut self.lines {
            line.recompute();
        }
    }

    /// Parse the start date display text.
    pub fn start_date_parsed(&self, date_format: &str) -> Result<NaiveDate> {
        parse_date(&self.start_date, date_format)
    }

    /// Parse the end date display text.
    pub fn end_date_parsed(&self, date_format: &str) -> Result<NaiveDate> {
        parse_date(&self.end_date, date_format)
    }

    /// Reset header fields and drop all lines. Serial and dates are left as they are.
    pub fn clear(&mut self) {
        self.company.clear();
        self.responsible.clear();
        self.phone.clear();
        self.address.clear();
        self.lines.clear();
    }
}

fn parse_date(value: &str, date_format: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), date_format).map_err(|_| OrderError::DateParse {
        value: value.to_string(),
        format: date_format.to_string(),
    })
}
