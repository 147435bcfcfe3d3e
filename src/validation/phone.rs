//! Phone number format check.

use serde::{Deserialize, Serialize};

/// Accepted layout; `D` stands for one ASCII digit.
pub const PHONE_PATTERN: &str = "+7 (DDD) DDD-DD-DD";

/// What to do with a phone that fails [`validate_phone`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhonePolicy {
    /// Report it and keep the phone as typed.
    #[default]
    ValidateOnly,
    /// Refuse to export or send the order.
    EnforceOnSubmit,
}

impl PhonePolicy {
    /// Check if an invalid phone blocks submission.
    pub fn blocks_submit(&self) -> bool {
        matches!(self, PhonePolicy::EnforceOnSubmit)
    }
}

/// Check that `phone` is exactly `+7 (DDD) DDD-DD-DD`. No normalization.
pub fn validate_phone(phone: &str) -> bool {
    let pattern = PHONE_PATTERN.as_bytes();
    let bytes = phone.as_bytes();

    bytes.len() == pattern.len()
        && pattern.iter().zip(bytes).all(|(&p, &b)| match p {
            b'D' => b.is_ascii_digit(),
            _ => p == b,
        })
}
