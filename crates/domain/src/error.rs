//! Domain error types.

use chrono::NaiveDate;
use thiserror::Error;

use crate::money::Money;

/// Errors raised by domain-level validation.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The check-out date is not strictly after the check-in date.
    #[error("check-out date {check_out} must be strictly after check-in date {check_in}")]
    InvalidDateRange {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    /// A monetary amount that must be positive is zero or negative.
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(Money),
}
