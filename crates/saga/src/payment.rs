//! Payment orchestrator.
//!
//! Validates and processes a charge for an existing reservation, persists
//! the payment record in a terminal status, and notifies the reservation
//! orchestrator on success. The gateway call can fail freely: declines
//! and transport errors both land as a `FAILED` record, and the
//! confirmation callback is a detached best-effort step protected by the
//! callee's idempotency.

use common::{PaymentId, ReservationId};
use domain::{CardDetails, Money, Payment, PaymentMethod, PaymentStatus};
use store::{NewPayment, PaymentStore};

use crate::error::{BookingError, Result};
use crate::ids::TransactionIdGenerator;
use crate::services::confirmation::ReservationConfirmer;
use crate::services::gateway::{CaptureOutcome, ChargeRequest, PaymentGateway};

/// Request to process a payment.
#[derive(Debug, Clone)]
pub struct ProcessPayment {
    pub reservation_id: ReservationId,
    pub amount: Money,
    pub method: Option<PaymentMethod>,
    pub card: CardDetails,
}

/// Orchestrates the payment side of the booking saga.
pub struct PaymentOrchestrator<P, G, C, T> {
    store: P,
    gateway: G,
    confirmer: C,
    transaction_ids: T,
}

impl<P, G, C, T> PaymentOrchestrator<P, G, C, T>
where
    P: PaymentStore,
    G: PaymentGateway,
    C: ReservationConfirmer,
    T: TransactionIdGenerator,
{
    /// Creates a new orchestrator.
    pub fn new(store: P, gateway: G, confirmer: C, transaction_ids: T) -> Self {
        Self {
            store,
            gateway,
            confirmer,
            transaction_ids,
        }
    }

    /// Processes a charge for a reservation.
    ///
    /// The persisted record always lands in a terminal status: the card
    /// sanity gate and every gateway failure mode map to `FAILED` rather
    /// than propagating. Exactly one payment may exist per reservation;
    /// the pre-check catches the common case and the store's uniqueness
    /// constraint serializes the race.
    #[tracing::instrument(
        skip(self, request),
        fields(reservation_id = %request.reservation_id, amount = %request.amount)
    )]
    pub async fn process_payment(&self, request: ProcessPayment) -> Result<Payment> {
        metrics::counter!("payments_requested_total").increment(1);

        if !request.amount.is_positive() {
            return Err(BookingError::InvalidRequest(
                "amount must be greater than zero".to_string(),
            ));
        }

        if let Some(existing) = self.store.get_by_reservation(request.reservation_id).await? {
            tracing::info!(
                payment_id = %existing.id,
                status = %existing.status,
                "payment already exists for reservation"
            );
            return Err(BookingError::DuplicatePayment(request.reservation_id));
        }

        let transaction_id = self.transaction_ids.next_id();
        let masked_number = request.card.masked_number();

        let status = if !request.card.passes_basic_checks() {
            tracing::warn!("card failed basic validation, recording failed payment");
            PaymentStatus::Failed
        } else {
            let charge = ChargeRequest {
                reservation_id: request.reservation_id,
                amount: request.amount,
                transaction_id: transaction_id.clone(),
                card: request.card.clone(),
            };
            match self.gateway.capture(&charge).await {
                Ok(CaptureOutcome::Approved) => PaymentStatus::Completed,
                Ok(CaptureOutcome::Declined { reason }) => {
                    tracing::warn!(%reason, "gateway declined the charge");
                    PaymentStatus::Failed
                }
                Err(e) => {
                    metrics::counter!("gateway_failures_total").increment(1);
                    tracing::warn!(error = %e, "gateway unreachable, recording failed payment");
                    PaymentStatus::Failed
                }
            }
        };

        // A store uniqueness violation here means another instance won the
        // race after the pre-check; it converts to DuplicatePayment.
        let payment = self
            .store
            .insert(NewPayment {
                reservation_id: request.reservation_id,
                transaction_id,
                amount: request.amount,
                method: request.method.unwrap_or_default(),
                card_number: masked_number,
                card_holder_name: request.card.holder_name.clone(),
                card_expiry: request.card.expiry.clone(),
                status,
            })
            .await?;

        if payment.status == PaymentStatus::Completed {
            metrics::counter!("payments_completed_total").increment(1);
            if let Err(e) = self.confirmer.confirm(payment.reservation_id).await {
                metrics::counter!("confirmation_callback_failures_total").increment(1);
                tracing::warn!(
                    reservation_id = %payment.reservation_id,
                    error = %e,
                    "payment completed but confirmation callback failed; \
                     a later retry converges via the callback's idempotency"
                );
            }
        } else {
            metrics::counter!("payments_failed_total").increment(1);
        }

        tracing::info!(
            payment_id = %payment.id,
            transaction_id = %payment.transaction_id,
            status = %payment.status,
            "payment processed"
        );
        Ok(payment)
    }

    /// Fetches a payment by id.
    pub async fn get_payment(&self, id: PaymentId) -> Result<Payment> {
        self.store.get(id).await?.ok_or(BookingError::NotFound {
            entity: "payment",
            id: id.as_i64(),
        })
    }

    /// Fetches the payment for a reservation.
    pub async fn get_payment_by_reservation(
        &self,
        reservation_id: ReservationId,
    ) -> Result<Payment> {
        self.store
            .get_by_reservation(reservation_id)
            .await?
            .ok_or(BookingError::NotFound {
                entity: "payment",
                id: reservation_id.as_i64(),
            })
    }

    /// Refunds a completed payment.
    ///
    /// No reservation-state change or inventory release is triggered
    /// here; compensation of the booking itself is a separate flow.
    #[tracing::instrument(skip(self))]
    pub async fn refund_payment(&self, id: PaymentId) -> Result<Payment> {
        let mut payment = self.store.get(id).await?.ok_or(BookingError::NotFound {
            entity: "payment",
            id: id.as_i64(),
        })?;

        if !payment.refund() {
            return Err(BookingError::InvalidState {
                expected: PaymentStatus::Completed.to_string(),
                actual: payment.status.to_string(),
            });
        }

        let updated = self.store.update(&payment).await?;
        metrics::counter!("payments_refunded_total").increment(1);
        tracing::info!(payment_id = %id, "payment refunded");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialTransactionIds;
    use crate::services::confirmation::RecordingConfirmer;
    use crate::services::gateway::SimulatedGateway;
    use store::InMemoryPaymentStore;

    type TestOrchestrator = PaymentOrchestrator<
        InMemoryPaymentStore,
        SimulatedGateway,
        RecordingConfirmer,
        SequentialTransactionIds,
    >;

    fn setup() -> (
        TestOrchestrator,
        InMemoryPaymentStore,
        SimulatedGateway,
        RecordingConfirmer,
    ) {
        let store = InMemoryPaymentStore::new();
        let gateway = SimulatedGateway::new();
        let confirmer = RecordingConfirmer::new();

        let orchestrator = PaymentOrchestrator::new(
            store.clone(),
            gateway.clone(),
            confirmer.clone(),
            SequentialTransactionIds::new(),
        );
        (orchestrator, store, gateway, confirmer)
    }

    fn request(reservation: i64, amount_cents: i64) -> ProcessPayment {
        ProcessPayment {
            reservation_id: ReservationId::new(reservation),
            amount: Money::from_cents(amount_cents),
            method: Some(PaymentMethod::CreditCard),
            card: CardDetails {
                number: "4111111111111111".to_string(),
                holder_name: Some("Amina Benali".to_string()),
                expiry: Some("12/27".to_string()),
                cvv: "123".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_successful_payment_confirms_reservation() {
        let (orchestrator, store, _, confirmer) = setup();

        let payment = orchestrator.process_payment(request(1, 30000)).await.unwrap();

        assert_eq!(payment.status, PaymentStatus::Completed);
        assert_eq!(payment.transaction_id.as_str(), "TXN-0001");
        assert_eq!(store.count().await, 1);
        assert!(confirmer.was_confirmed(ReservationId::new(1)));
    }

    #[tokio::test]
    async fn test_zero_amount_rejected() {
        let (orchestrator, store, _, _) = setup();

        let result = orchestrator.process_payment(request(1, 0)).await;
        assert!(matches!(result, Err(BookingError::InvalidRequest(_))));
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_negative_amount_rejected() {
        let (orchestrator, _, _, _) = setup();

        let result = orchestrator.process_payment(request(1, -100)).await;
        assert!(matches!(result, Err(BookingError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_duplicate_payment_rejected_regardless_of_status() {
        let (orchestrator, _, gateway, _) = setup();

        // first attempt fails at the gateway and is persisted FAILED
        gateway.set_decline(true);
        let first = orchestrator.process_payment(request(1, 30000)).await.unwrap();
        assert_eq!(first.status, PaymentStatus::Failed);

        // a retry is still a duplicate
        gateway.set_decline(false);
        let second = orchestrator.process_payment(request(1, 30000)).await;
        assert!(matches!(
            second,
            Err(BookingError::DuplicatePayment(id)) if id.as_i64() == 1
        ));
    }

    #[tokio::test]
    async fn test_card_number_is_masked_before_persist() {
        let (orchestrator, store, _, _) = setup();

        let payment = orchestrator.process_payment(request(1, 30000)).await.unwrap();

        let stored = store.get(payment.id).await.unwrap().unwrap();
        let card = stored.card_number.unwrap();
        assert!(card.ends_with("1111"));
        assert!(!card.contains("411111111111"));
    }

    #[tokio::test]
    async fn test_short_card_number_fails_without_gateway_call() {
        let (orchestrator, store, gateway, confirmer) = setup();

        let mut req = request(1, 30000);
        req.card.number = "41111111".to_string();

        let payment = orchestrator.process_payment(req).await.unwrap();
        assert_eq!(payment.status, PaymentStatus::Failed);
        assert_eq!(gateway.capture_count(), 0);
        assert_eq!(confirmer.confirmation_count(), 0);
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_bad_cvv_fails_without_gateway_call() {
        let (orchestrator, _, gateway, _) = setup();

        let mut req = request(1, 30000);
        req.card.cvv = "12".to_string();

        let payment = orchestrator.process_payment(req).await.unwrap();
        assert_eq!(payment.status, PaymentStatus::Failed);
        assert_eq!(gateway.capture_count(), 0);
    }

    #[tokio::test]
    async fn test_gateway_outage_lands_failed_record() {
        let (orchestrator, store, gateway, confirmer) = setup();
        gateway.set_fail_on_capture(true);

        // the transport error is swallowed, not propagated
        let payment = orchestrator.process_payment(request(1, 30000)).await.unwrap();
        assert_eq!(payment.status, PaymentStatus::Failed);
        assert_eq!(store.count().await, 1);
        assert_eq!(confirmer.confirmation_count(), 0);
    }

    #[tokio::test]
    async fn test_callback_failure_leaves_payment_completed() {
        let (orchestrator, store, _, confirmer) = setup();
        confirmer.set_fail_on_confirm(true);

        let payment = orchestrator.process_payment(request(1, 30000)).await.unwrap();

        assert_eq!(payment.status, PaymentStatus::Completed);
        let stored = store.get(payment.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn test_refund_lifecycle() {
        let (orchestrator, _, _, _) = setup();

        let payment = orchestrator.process_payment(request(1, 30000)).await.unwrap();

        let refunded = orchestrator.refund_payment(payment.id).await.unwrap();
        assert_eq!(refunded.status, PaymentStatus::Refunded);

        // a second refund is invalid
        let again = orchestrator.refund_payment(payment.id).await;
        assert!(matches!(again, Err(BookingError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn test_refund_of_failed_payment_rejected() {
        let (orchestrator, _, gateway, _) = setup();
        gateway.set_decline(true);

        let payment = orchestrator.process_payment(request(1, 30000)).await.unwrap();
        assert_eq!(payment.status, PaymentStatus::Failed);

        let result = orchestrator.refund_payment(payment.id).await;
        match result {
            Err(BookingError::InvalidState { expected, actual }) => {
                assert_eq!(expected, "COMPLETED");
                assert_eq!(actual, "FAILED");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_refund_missing_payment() {
        let (orchestrator, _, _, _) = setup();

        let result = orchestrator.refund_payment(PaymentId::new(42)).await;
        assert!(matches!(
            result,
            Err(BookingError::NotFound { entity: "payment", id: 42 })
        ));
    }

    #[tokio::test]
    async fn test_lookup_by_reservation() {
        let (orchestrator, _, _, _) = setup();

        let payment = orchestrator.process_payment(request(7, 30000)).await.unwrap();

        let found = orchestrator
            .get_payment_by_reservation(ReservationId::new(7))
            .await
            .unwrap();
        assert_eq!(found.id, payment.id);

        let missing = orchestrator
            .get_payment_by_reservation(ReservationId::new(8))
            .await;
        assert!(matches!(missing, Err(BookingError::NotFound { .. })));
    }
}
