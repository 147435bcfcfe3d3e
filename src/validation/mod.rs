//! Validation logic for order records.

mod phone;
mod validate;

pub use phone::{validate_phone, PhonePolicy, PHONE_PATTERN};
pub use validate::{validate_order, ValidationResult};
