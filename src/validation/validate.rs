//! Whole-record checks run before export and send.

use super::{validate_phone, PhonePolicy};
use crate::calc::parse_amount;
use crate::config::{AMOUNT_DP, MAX_AMOUNT};
use crate::model::OrderRecord;

/// Validation result with warnings.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Whether validation passed.
    pub passed: bool,
    /// Warning messages.
    pub warnings: Vec<String>,
    /// Error messages.
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Create a passing result.
    pub fn ok() -> Self {
        Self {
            passed: true,
            ..Default::default()
        }
    }

    /// Add a warning.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Add an error.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.passed = false;
    }
}

/// Validate an order record.
///
/// Only an invalid phone under [`PhonePolicy::EnforceOnSubmit`] fails the
/// result; everything else is a warning and the order can still be written.
pub fn validate_order(
    record: &OrderRecord,
    phone_policy: PhonePolicy,
    date_format: &str,
) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if !validate_phone(&record.phone) {
        let message = format!("Phone '{}' does not match +7 (DDD) DDD-DD-DD", record.phone);
        if phone_policy.blocks_submit() {
            result.add_error(message);
        } else {
            result.add_warning(message);
        }
    }

    if let (Ok(start), Ok(end)) = (
        record.start_date_parsed(date_format),
        record.end_date_parsed(date_format),
    ) {
        if end < start {
            result.add_warning(format!(
                "End date {} is before start date {}",
                record.end_date, record.start_date
            ));
        }
    }

    if record.lines.is_empty() {
        result.add_warning("Order has no product lines");
    }

    for (idx, line) in record.lines.iter().enumerate() {
        if line.name.trim().is_empty() {
            result.add_warning(format!("Line {}: Missing product name", idx + 1));
        }
        for (field, text) in [("quantity", &line.quantity), ("price", &line.price)] {
            match parse_amount(field, text) {
                Ok(value) if value.normalize().scale() > AMOUNT_DP => {
                    result.add_warning(format!(
                        "Line {}: {} '{}' has more than {} decimal places",
                        idx + 1,
                        field,
                        text,
                        AMOUNT_DP
                    ));
                }
                Ok(_) => {}
                Err(err) => {
                    result.add_warning(format!(
                        "Line {}: {} (allowed 0..={}), sum counted as 0.00",
                        idx + 1,
                        err,
                        MAX_AMOUNT
                    ));
                }
            }
        }
    }

    result
}
