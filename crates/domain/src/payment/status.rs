//! Payment state machine.

use serde::{Deserialize, Serialize};

/// The state of a payment record.
///
/// State transitions:
/// ```text
/// Pending ──┬──► Completed ──► Refunded
///           └──► Failed
/// ```
///
/// A payment is finalized synchronously after the gateway call, so
/// `Pending` is only observable mid-flight; persisted records are always
/// in one of the other three states. Records are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    /// Charge in flight, no gateway outcome yet.
    #[default]
    Pending,

    /// The gateway approved the charge.
    Completed,

    /// The charge was declined or the gateway was unreachable.
    Failed,

    /// A completed charge was refunded on explicit request.
    Refunded,
}

impl PaymentStatus {
    /// Returns true if a refund may be issued from this state.
    pub fn can_refund(&self) -> bool {
        matches!(self, PaymentStatus::Completed)
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Failed | PaymentStatus::Refunded)
    }

    /// Returns the state name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Refunded => "REFUNDED",
        }
    }

    /// Parses a stored state name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(PaymentStatus::Pending),
            "COMPLETED" => Some(PaymentStatus::Completed),
            "FAILED" => Some(PaymentStatus::Failed),
            "REFUNDED" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_pending() {
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
    }

    #[test]
    fn test_refund_only_from_completed() {
        assert!(PaymentStatus::Completed.can_refund());
        assert!(!PaymentStatus::Pending.can_refund());
        assert!(!PaymentStatus::Failed.can_refund());
        assert!(!PaymentStatus::Refunded.can_refund());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(!PaymentStatus::Completed.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());
        assert!(PaymentStatus::Refunded.is_terminal());
    }

    #[test]
    fn test_parse_roundtrip() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Completed,
            PaymentStatus::Failed,
            PaymentStatus::Refunded,
        ] {
            assert_eq!(PaymentStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(PaymentStatus::parse("VOIDED"), None);
    }
}
