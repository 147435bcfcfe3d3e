//! Total computation: per-line sums and the commission-adjusted grand total.

use crate::config::{CURRENCY, MAX_AMOUNT, MAX_COMMISSION_PERCENT};
use crate::error::{OrderError, Result};
use crate::model::LineItem;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::str::FromStr;
use tracing::debug;

/// Money values are kept to two decimal places.
const MONEY_DP: u32 = 2;

/// Result of a total computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    /// Sum of each line, in row order.
    pub line_sums: Vec<Decimal>,
    /// Commission-adjusted total.
    pub grand_total: Decimal,
}

impl Totals {
    /// Text shown under the product table.
    pub fn display(&self) -> String {
        format!("Итог: {:.2} {}", self.grand_total, CURRENCY)
    }
}

/// Round half away from zero to two decimals.
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_DP);
    rounded
}

/// Parse a quantity or price cell.
///
/// Empty text is zero. Negative values and values above [`MAX_AMOUNT`] are
/// rejected. Extra decimal places are kept; the line sum is rounded.
pub fn parse_amount(field: &str, text: &str) -> Result<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Decimal::ZERO);
    }

    let invalid = || OrderError::InvalidNumber {
        field: field.to_string(),
        value: text.to_string(),
    };

    let value = Decimal::from_str(trimmed).map_err(|_| invalid())?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(invalid());
    }
    if value > Decimal::from(MAX_AMOUNT) {
        return Err(invalid());
    }
    Ok(value)
}

/// Compute `round(quantity * price, 2)`.
pub fn compute_line_sum(quantity: &str, price: &str) -> Result<Decimal> {
    let q = parse_amount("quantity", quantity)?;
    let p = parse_amount("price", price)?;
    let product = q.checked_mul(p).ok_or_else(|| OrderError::InvalidNumber {
        field: "sum".to_string(),
        value: format!("{} * {}", quantity, price),
    })?;
    Ok(round_money(product))
}

/// Like [`compute_line_sum`], but a bad row counts as 0.00.
pub fn line_sum_or_zero(quantity: &str, price: &str) -> Decimal {
    compute_line_sum(quantity, price).unwrap_or_else(|err| {
        debug!("Line sum zeroed: {}", err);
        round_money(Decimal::ZERO)
    })
}

/// Compute line sums and the grand total for `commission_percent` in 0..=100.
///
/// Sums are derived from each line's quantity and price, not read from
/// `LineItem::sum`, so stale lines cannot leak into the total.
pub fn compute_totals(lines: &[LineItem], commission_percent: u32) -> Result<Totals> {
    if commission_percent > MAX_COMMISSION_PERCENT {
        return Err(OrderError::InvalidCommission {
            value: commission_percent,
        });
    }

    let line_sums: Vec<Decimal> = lines
        .iter()
        .map(|line| line_sum_or_zero(&line.quantity, &line.price))
        .collect();

    let overflow = || OrderError::InvalidNumber {
        field: "total".to_string(),
        value: format!("{} line(s)", lines.len()),
    };
    let subtotal = line_sums
        .iter()
        .try_fold(Decimal::ZERO, |acc, sum| acc.checked_add(*sum))
        .ok_or_else(overflow)?;
    let factor = Decimal::ONE + Decimal::new(i64::from(commission_percent), 2);
    let grand_total = round_money(subtotal.checked_mul(factor).ok_or_else(overflow)?);

    Ok(Totals {
        line_sums,
        grand_total,
    })
}

/// Grand total only.
pub fn compute_grand_total(lines: &[LineItem], commission_percent: u32) -> Result<Decimal> {
    compute_totals(lines, commission_percent).map(|t| t.grand_total)
}
