//! Headless order form session.
//!
//! Holds the record being edited and the commission rate. Every mutation
//! recomputes the line sums and the total, so the derived values are never
//! stale between calls. A failed load, save or send leaves the session as it
//! was.

use crate::calc::{compute_totals, Totals};
use crate::codec::SheetLayout;
use crate::config::{AppConfig, MAX_COMMISSION_PERCENT};
use crate::error::{OrderError, Result};
use crate::model::{LineItem, OrderRecord};
use crate::store::AppendOutcome;
use std::path::Path;
use tracing::warn;

/// Editable order plus its derived totals.
#[derive(Debug, Clone)]
pub struct OrderForm {
    config: AppConfig,
    record: OrderRecord,
    commission_percent: u32,
    totals: Totals,
}

impl OrderForm {
    /// Start a form with an empty record dated today.
    pub fn new(config: AppConfig) -> Result<Self> {
        config.check()?;
        let record = OrderRecord::new(&config.date_format);
        let mut form = Self {
            commission_percent: config.commission_percent,
            config,
            record,
            totals: Totals::default(),
        };
        form.refresh();
        Ok(form)
    }

    /// Record being edited.
    pub fn record(&self) -> &OrderRecord {
        &self.record
    }

    /// Configuration in use.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Commission in percent.
    pub fn commission_percent(&self) -> u32 {
        self.commission_percent
    }

    /// Current totals.
    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Edit header fields (serial, company, phone, ...).
    pub fn edit_header(&mut self, edit: impl FnOnce(&mut OrderRecord)) {
        edit(&mut self.record);
        self.refresh();
    }

    /// Append a line and return its index.
    pub fn add_line(&mut self, line: LineItem) -> usize {
        let index = self.record.add_line(line);
        self.refresh();
        index
    }

    /// Remove the line at `index`.
    pub fn remove_line(&mut self, index: usize) -> Result<LineItem> {
        let line = self.record.remove_line(index)?;
        self.refresh();
        Ok(line)
    }

    /// Edit the line at `index`.
    pub fn update_line(&mut self, index: usize, edit: impl FnOnce(&mut LineItem)) -> Result<()> {
        edit(self.record.line_mut(index)?);
        self.refresh();
        Ok(())
    }

    /// Change the commission rate (0..=100).
    pub fn set_commission(&mut self, percent: u32) -> Result<()> {
        if percent > MAX_COMMISSION_PERCENT {
            return Err(OrderError::InvalidCommission { value: percent });
        }
        self.commission_percent = percent;
        self.refresh();
        Ok(())
    }

    /// Empty the header fields and lines.
    pub fn clear(&mut self) {
        self.record.clear();
        self.refresh();
    }

    /// Replace the record with the contents of an order sheet.
    pub fn load_from_file(&mut self, path: &Path, layout: SheetLayout) -> Result<()> {
        let record = crate::import_order_file(path, layout, &self.config.date_format)?;
        self.record = record;
        self.refresh();
        Ok(())
    }

    /// Save the record as an order sheet. Returns the serials written.
    pub fn save_to_file(&self, path: &Path) -> Result<Vec<String>> {
        crate::export_order_file(&self.record, path, &self.config)
    }

    /// Append the record to the database store.
    pub fn send(&self) -> Result<AppendOutcome> {
        crate::send_order(&self.record, &self.config)
    }

    fn refresh(&mut self) {
        self.record.recompute_sums();
        match compute_totals(&self.record.lines, self.commission_percent) {
            Ok(totals) => self.totals = totals,
            Err(err) => warn!("Totals not updated: {}", err),
        }
    }
}
