//! Data model types for order intake.

mod line_item;
mod order;

pub use line_item::LineItem;
pub use order::OrderRecord;
