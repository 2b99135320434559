//! Payment store contract.

use async_trait::async_trait;
use common::{PaymentId, ReservationId, TransactionId};
use domain::{Money, Payment, PaymentMethod, PaymentStatus};

use crate::error::Result;

/// A payment record that has not been persisted yet.
///
/// `card_number` must already be masked; stores persist it verbatim.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub reservation_id: ReservationId,
    pub transaction_id: TransactionId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub card_number: Option<String>,
    pub card_holder_name: Option<String>,
    pub card_expiry: Option<String>,
    pub status: PaymentStatus,
}

/// Store for payment rows.
///
/// Implementations enforce the uniqueness invariant: at most one
/// non-refunded payment per reservation. Two requests racing to pay the
/// same reservation are serialized here, not by in-process locking, since
/// the payment orchestrator may run as multiple concurrent instances.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Persists a new payment, assigning its id and timestamps.
    ///
    /// Fails with [`StoreError::DuplicatePayment`] when a non-refunded
    /// payment already exists for the same reservation.
    ///
    /// [`StoreError::DuplicatePayment`]: crate::StoreError::DuplicatePayment
    async fn insert(&self, new: NewPayment) -> Result<Payment>;

    /// Fetches a payment by id.
    async fn get(&self, id: PaymentId) -> Result<Option<Payment>>;

    /// Fetches the most recent payment for a reservation.
    async fn get_by_reservation(&self, reservation_id: ReservationId) -> Result<Option<Payment>>;

    /// Fetches a payment by its externally visible transaction id.
    async fn get_by_transaction(&self, transaction_id: &TransactionId) -> Result<Option<Payment>>;

    /// Writes back a mutated payment, refreshing `updated_at`.
    async fn update(&self, payment: &Payment) -> Result<Payment>;
}
