//! Line sums and commission-adjusted totals.

mod totals;

pub use totals::{
    compute_grand_total, compute_line_sum, compute_totals, line_sum_or_zero, parse_amount,
    round_money, Totals,
};
