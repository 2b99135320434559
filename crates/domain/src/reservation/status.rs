//! Reservation state machine.

use serde::{Deserialize, Serialize};

/// The state of a reservation in its lifecycle.
///
/// State transitions:
/// ```text
/// Pending ──(confirm_payment)──► Confirmed
///    │                               │
///    └──────────(cancel)─────────────┴──► deleted
/// ```
///
/// Cancellation removes the record entirely, so there is no `Cancelled`
/// variant; absence of the row is the cancelled state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ReservationStatus {
    /// Created and persisted, awaiting payment.
    #[default]
    Pending,

    /// Payment received; the booking is final.
    Confirmed,
}

impl ReservationStatus {
    /// Returns true if the confirmation transition would mutate state.
    pub fn can_confirm(&self) -> bool {
        matches!(self, ReservationStatus::Pending)
    }

    /// Returns true if payment has already been confirmed.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, ReservationStatus::Confirmed)
    }

    /// Returns the state name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "PENDING",
            ReservationStatus::Confirmed => "CONFIRMED",
        }
    }

    /// Parses a stored state name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(ReservationStatus::Pending),
            "CONFIRMED" => Some(ReservationStatus::Confirmed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
