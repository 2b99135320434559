//! Stay date range value object.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A validated check-in/check-out date pair.
///
/// Invariant: `check_out` is strictly after `check_in`, so the stay always
/// spans at least one night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayDates {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayDates {
    /// Creates a stay range, rejecting same-day or reversed dates.
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, DomainError> {
        if check_out <= check_in {
            return Err(DomainError::InvalidDateRange {
                check_in,
                check_out,
            });
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// Returns the check-in date.
    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    /// Returns the check-out date.
    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Returns the number of nights as a whole-day difference.
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

impl std::fmt::Display for StayDates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}", self.check_in, self.check_out)
    }
}
