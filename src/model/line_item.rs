//! Product line of an order.

use crate::calc::line_sum_or_zero;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One product row of an order.
///
/// Quantity and price hold the text the operator typed; `sum` is derived from
/// them by [`LineItem::recompute`] and is stale until that runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItem {
    /// Product name.
    pub name: String,
    /// Unit of measure.
    pub unit: String,
    /// Quantity text. Empty counts as zero.
    pub quantity: String,
    /// Unit price text. Empty counts as zero.
    pub price: String,
    /// Derived `round(quantity * price, 2)`.
    pub sum: Decimal,
    /// Free-form note.
    pub note: String,
}

impl LineItem {
    /// Create a line and compute its sum.
    pub fn new(
        name: impl Into<String>,
        unit: impl Into<String>,
        quantity: impl Into<String>,
        price: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        let mut line = Self {
            name: name.into(),
            unit: unit.into(),
            quantity: quantity.into(),
            price: price.into(),
            sum: Decimal::ZERO,
            note: note.into(),
        };
        line.recompute();
        line
    }

    /// Recompute `sum` from quantity and price. Bad input yields 0.00.
    pub fn recompute(&mut self) {
        self.sum = line_sum_or_zero(&self.quantity, &self.price);
    }

    /// Check if every field is blank.
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
            && self.unit.trim().is_empty()
            && self.quantity.trim().is_empty()
            && self.price.trim().is_empty()
            && self.note.trim().is_empty()
    }

    /// Sum as shown in the sheet, always two decimals.
    pub fn sum_text(&self) -> String {
        format!("{:.2}", self.sum)
    }
}
