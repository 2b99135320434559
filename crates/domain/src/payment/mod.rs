//! Payment entity and its value objects.

pub mod card;
pub mod status;

use chrono::{DateTime, Utc};
use common::{PaymentId, ReservationId, TransactionId};
use serde::{Deserialize, Serialize};

use crate::money::Money;

pub use card::{CardDetails, mask_card_number};
pub use status::PaymentStatus;

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[default]
    CreditCard,
    Paypal,
    BankTransfer,
}

impl PaymentMethod {
    /// Returns the method name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "CREDIT_CARD",
            PaymentMethod::Paypal => "PAYPAL",
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
        }
    }

    /// Parses a stored method name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CREDIT_CARD" => Some(PaymentMethod::CreditCard),
            "PAYPAL" => Some(PaymentMethod::Paypal),
            "BANK_TRANSFER" => Some(PaymentMethod::BankTransfer),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted payment record.
///
/// `card_number` only ever holds the masked form; the full PAN is never
/// stored. Records are created in a terminal status and never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub reservation_id: ReservationId,
    pub transaction_id: TransactionId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub card_number: Option<String>,
    pub card_holder_name: Option<String>,
    pub card_expiry: Option<String>,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Transitions a completed payment to `Refunded`.
    ///
    /// Returns false without mutating when the current status does not
    /// allow a refund.
    pub fn refund(&mut self) -> bool {
        if !self.status.can_refund() {
            return false;
        }
        self.status = PaymentStatus::Refunded;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payment(status: PaymentStatus) -> Payment {
        Payment {
            id: PaymentId::new(1),
            reservation_id: ReservationId::new(1),
            transaction_id: TransactionId::new("TXN-0001"),
            amount: Money::from_cents(30000),
            method: PaymentMethod::CreditCard,
            card_number: Some("**** **** **** 1111".to_string()),
            card_holder_name: None,
            card_expiry: None,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_refund_from_completed() {
        let mut payment = sample_payment(PaymentStatus::Completed);
        assert!(payment.refund());
        assert_eq!(payment.status, PaymentStatus::Refunded);
    }

    #[test]
    fn test_refund_rejected_otherwise() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Failed,
            PaymentStatus::Refunded,
        ] {
            let mut payment = sample_payment(status);
            assert!(!payment.refund());
            assert_eq!(payment.status, status);
        }
    }

    #[test]
    fn test_method_parse_roundtrip() {
        for method in [
            PaymentMethod::CreditCard,
            PaymentMethod::Paypal,
            PaymentMethod::BankTransfer,
        ] {
            assert_eq!(PaymentMethod::parse(method.as_str()), Some(method));
        }
        assert_eq!(PaymentMethod::parse("CASH"), None);
    }

    #[test]
    fn test_method_serde_matches_wire_names() {
        let json = serde_json::to_string(&PaymentMethod::CreditCard).unwrap();
        assert_eq!(json, "\"CREDIT_CARD\"");
        let back: PaymentMethod = serde_json::from_str("\"PAYPAL\"").unwrap();
        assert_eq!(back, PaymentMethod::Paypal);
    }
}
