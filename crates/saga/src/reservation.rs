//! Reservation orchestrator.
//!
//! Drives the create/confirm/cancel flow across the identity and
//! inventory collaborators. The persisted reservation row is the
//! atomicity boundary: validation and reference checks run before the
//! insert, and the room-availability mutation afterwards is a detached
//! best-effort step whose failure never unwinds the committed write.

use chrono::NaiveDate;
use common::{HotelId, ReservationId, RoomId, UserId};
use domain::{GuestContact, Money, Reservation, ReservationStatus, StayDates};
use store::{NewReservation, ReservationStore};

use crate::error::{BookingError, Result};
use crate::remote::reference_error;
use crate::services::identity::IdentityService;
use crate::services::inventory::InventoryService;

/// Nightly rate applied when no room is selected.
pub const DEFAULT_NIGHTLY_RATE: Money = Money::from_cents(10_000);

/// Request to create a reservation.
#[derive(Debug, Clone)]
pub struct CreateReservation {
    pub user_id: UserId,
    pub hotel_id: HotelId,
    pub room_id: Option<RoomId>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guest: GuestContact,
}

/// Orchestrates the reservation side of the booking saga.
pub struct ReservationOrchestrator<R, U, I> {
    store: R,
    identity: U,
    inventory: I,
}

impl<R, U, I> ReservationOrchestrator<R, U, I>
where
    R: ReservationStore,
    U: IdentityService,
    I: InventoryService,
{
    /// Creates a new orchestrator.
    pub fn new(store: R, identity: U, inventory: I) -> Self {
        Self {
            store,
            identity,
            inventory,
        }
    }

    /// Validates a booking request, prices it, and persists a `PENDING`
    /// reservation.
    ///
    /// Either fully fails before persistence (no reservation created, no
    /// room mutated) or fully succeeds with a durable `PENDING` row. The
    /// trailing room hold is best-effort; its failure is logged and does
    /// not reach the caller.
    #[tracing::instrument(
        skip(self, request),
        fields(user_id = %request.user_id, hotel_id = %request.hotel_id)
    )]
    pub async fn create(&self, request: CreateReservation) -> Result<Reservation> {
        metrics::counter!("reservations_requested_total").increment(1);

        let stay = StayDates::new(request.check_in, request.check_out)?;

        self.identity
            .get_user(request.user_id)
            .await
            .map_err(|e| reference_error("user", request.user_id.as_i64(), "identity", e))?;

        self.inventory
            .get_hotel(request.hotel_id)
            .await
            .map_err(|e| reference_error("hotel", request.hotel_id.as_i64(), "inventory", e))?;

        let price_per_night = match request.room_id {
            Some(room_id) => {
                let room = self
                    .inventory
                    .get_room(request.hotel_id, room_id)
                    .await
                    .map_err(|e| reference_error("room", room_id.as_i64(), "inventory", e))?;
                if !room.available {
                    // Availability is not a hard precondition; the hold
                    // below and later reconciliation keep inventory honest.
                    tracing::warn!(%room_id, "room currently marked unavailable, booking anyway");
                }
                room.price_per_night
            }
            None => DEFAULT_NIGHTLY_RATE,
        };

        let total_price = price_per_night.multiply(stay.nights());

        let reservation = self
            .store
            .insert(NewReservation {
                user_id: request.user_id,
                hotel_id: request.hotel_id,
                room_id: request.room_id,
                stay,
                guest: request.guest,
                total_price,
                status: ReservationStatus::Pending,
            })
            .await?;

        if let Some(room_id) = reservation.room_id
            && let Err(e) = self
                .inventory
                .set_room_availability(reservation.hotel_id, room_id, false)
                .await
        {
            metrics::counter!("room_hold_failures_total").increment(1);
            tracing::warn!(
                reservation_id = %reservation.id,
                %room_id,
                error = %e,
                "failed to hold room after reservation persisted"
            );
        }

        metrics::counter!("reservations_created_total").increment(1);
        tracing::info!(
            reservation_id = %reservation.id,
            nights = stay.nights(),
            total = %reservation.total_price,
            "reservation created"
        );

        Ok(reservation)
    }

    /// Transitions a reservation to `CONFIRMED` after a successful
    /// payment.
    ///
    /// Idempotent: a reservation that is already confirmed is returned
    /// as-is without a store write, so duplicate callbacks from payment
    /// retries are harmless.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_payment(&self, id: ReservationId) -> Result<Reservation> {
        let mut reservation = self.store.get(id).await?.ok_or(BookingError::NotFound {
            entity: "reservation",
            id: id.as_i64(),
        })?;

        if !reservation.confirm() {
            tracing::info!(reservation_id = %id, "reservation already confirmed");
            return Ok(reservation);
        }

        let updated = self.store.update(&reservation).await?;
        metrics::counter!("reservations_confirmed_total").increment(1);
        tracing::info!(reservation_id = %id, "reservation confirmed");
        Ok(updated)
    }

    /// Cancels a reservation: best-effort room release, then
    /// unconditional deletion of the row.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, id: ReservationId) -> Result<()> {
        let reservation = self.store.get(id).await?.ok_or(BookingError::NotFound {
            entity: "reservation",
            id: id.as_i64(),
        })?;

        if let Some(room_id) = reservation.room_id
            && let Err(e) = self
                .inventory
                .set_room_availability(reservation.hotel_id, room_id, true)
                .await
        {
            metrics::counter!("room_release_failures_total").increment(1);
            tracing::warn!(
                reservation_id = %id,
                %room_id,
                error = %e,
                "failed to release room during cancellation"
            );
        }

        self.store.delete(id).await?;
        metrics::counter!("reservations_cancelled_total").increment(1);
        tracing::info!(reservation_id = %id, "reservation cancelled");
        Ok(())
    }

    /// Fetches a reservation by id.
    pub async fn get(&self, id: ReservationId) -> Result<Reservation> {
        self.store.get(id).await?.ok_or(BookingError::NotFound {
            entity: "reservation",
            id: id.as_i64(),
        })
    }

    /// Lists all reservations.
    pub async fn list(&self) -> Result<Vec<Reservation>> {
        Ok(self.store.list().await?)
    }

    /// Lists the reservations made by a user.
    pub async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Reservation>> {
        Ok(self.store.list_by_user(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::identity::InMemoryIdentityService;
    use crate::services::inventory::InMemoryInventoryService;
    use store::InMemoryReservationStore;

    type TestOrchestrator = ReservationOrchestrator<
        InMemoryReservationStore,
        InMemoryIdentityService,
        InMemoryInventoryService,
    >;

    fn setup() -> (
        TestOrchestrator,
        InMemoryReservationStore,
        InMemoryInventoryService,
        InMemoryIdentityService,
    ) {
        let store = InMemoryReservationStore::new();
        let identity = InMemoryIdentityService::new();
        let inventory = InMemoryInventoryService::new();

        identity.add_user_id(UserId::new(1));
        inventory.add_hotel(HotelId::new(1), "Hotel Royal Casablanca", "Casablanca");
        inventory.add_room(
            HotelId::new(1),
            RoomId::new(101),
            Money::from_cents(15000),
            true,
        );

        let orchestrator =
            ReservationOrchestrator::new(store.clone(), identity.clone(), inventory.clone());
        (orchestrator, store, inventory, identity)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(room_id: Option<i64>) -> CreateReservation {
        CreateReservation {
            user_id: UserId::new(1),
            hotel_id: HotelId::new(1),
            room_id: room_id.map(RoomId::new),
            check_in: date(2024, 6, 1),
            check_out: date(2024, 6, 3),
            guest: GuestContact {
                first_name: "Amina".to_string(),
                last_name: "Benali".to_string(),
                email: "amina@example.com".to_string(),
                phone: "+212 600 000 000".to_string(),
                special_requests: None,
            },
        }
    }

    #[tokio::test]
    async fn test_create_prices_and_holds_room() {
        let (orchestrator, store, inventory, _) = setup();

        let reservation = orchestrator.create(request(Some(101))).await.unwrap();

        // two nights at $150.00
        assert_eq!(reservation.total_price, Money::from_cents(30000));
        assert_eq!(reservation.status, ReservationStatus::Pending);
        assert_eq!(store.count().await, 1);
        assert_eq!(
            inventory.room_available(HotelId::new(1), RoomId::new(101)),
            Some(false)
        );
    }

    #[tokio::test]
    async fn test_create_without_room_uses_default_rate() {
        let (orchestrator, _, inventory, _) = setup();

        let reservation = orchestrator.create(request(None)).await.unwrap();

        assert_eq!(reservation.total_price, DEFAULT_NIGHTLY_RATE.multiply(2));
        assert_eq!(inventory.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_bad_date_ordering_rejected_before_persist() {
        let (orchestrator, store, _, _) = setup();

        let mut req = request(Some(101));
        req.check_out = date(2024, 6, 1);
        req.check_in = date(2024, 6, 3);

        let result = orchestrator.create(req).await;
        assert!(matches!(result, Err(BookingError::InvalidRequest(_))));
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_same_day_stay_rejected() {
        let (orchestrator, store, _, _) = setup();

        let mut req = request(Some(101));
        req.check_out = req.check_in;

        let result = orchestrator.create(req).await;
        assert!(matches!(result, Err(BookingError::InvalidRequest(_))));
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_user_leaves_no_row() {
        let (orchestrator, store, _, _) = setup();

        let mut req = request(Some(101));
        req.user_id = UserId::new(99);

        let result = orchestrator.create(req).await;
        assert!(matches!(
            result,
            Err(BookingError::ReferenceNotFound { entity: "user", .. })
        ));
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_hotel_leaves_no_row() {
        let (orchestrator, store, _, _) = setup();

        let mut req = request(Some(101));
        req.hotel_id = HotelId::new(99);

        let result = orchestrator.create(req).await;
        assert!(matches!(
            result,
            Err(BookingError::ReferenceNotFound { entity: "hotel", .. })
        ));
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_room_leaves_no_row() {
        let (orchestrator, store, _, _) = setup();

        let result = orchestrator.create(request(Some(999))).await;
        assert!(matches!(
            result,
            Err(BookingError::ReferenceNotFound { entity: "room", .. })
        ));
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_identity_outage_is_upstream_unavailable() {
        let (orchestrator, store, _, identity) = setup();
        identity.set_fail_on_lookup(true);

        let result = orchestrator.create(request(Some(101))).await;
        assert!(matches!(
            result,
            Err(BookingError::UpstreamUnavailable { service: "identity", .. })
        ));
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_room_hold_failure_does_not_fail_create() {
        let (orchestrator, store, inventory, _) = setup();
        inventory.set_fail_on_mutation(true);

        let reservation = orchestrator.create(request(Some(101))).await.unwrap();

        assert_eq!(reservation.status, ReservationStatus::Pending);
        assert_eq!(store.count().await, 1);
        // the hold never landed
        assert_eq!(
            inventory.room_available(HotelId::new(1), RoomId::new(101)),
            Some(true)
        );
    }

    #[tokio::test]
    async fn test_unavailable_room_still_books() {
        let (orchestrator, store, inventory, _) = setup();
        inventory.add_room(
            HotelId::new(1),
            RoomId::new(102),
            Money::from_cents(25000),
            false,
        );

        let reservation = orchestrator.create(request(Some(102))).await.unwrap();
        assert_eq!(reservation.total_price, Money::from_cents(50000));
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_confirm_payment_is_idempotent() {
        let (orchestrator, _, _, _) = setup();
        let reservation = orchestrator.create(request(Some(101))).await.unwrap();

        let first = orchestrator.confirm_payment(reservation.id).await.unwrap();
        assert_eq!(first.status, ReservationStatus::Confirmed);

        let second = orchestrator.confirm_payment(reservation.id).await.unwrap();
        assert_eq!(second.status, ReservationStatus::Confirmed);
        // no second store write happened
        assert_eq!(second.updated_at, first.updated_at);
    }

    #[tokio::test]
    async fn test_confirm_payment_missing_reservation() {
        let (orchestrator, _, _, _) = setup();

        let result = orchestrator.confirm_payment(ReservationId::new(42)).await;
        assert!(matches!(
            result,
            Err(BookingError::NotFound { entity: "reservation", id: 42 })
        ));
    }

    #[tokio::test]
    async fn test_cancel_releases_room_and_deletes() {
        let (orchestrator, store, inventory, _) = setup();
        let reservation = orchestrator.create(request(Some(101))).await.unwrap();
        assert_eq!(
            inventory.room_available(HotelId::new(1), RoomId::new(101)),
            Some(false)
        );

        orchestrator.cancel(reservation.id).await.unwrap();

        assert_eq!(store.count().await, 0);
        assert_eq!(
            inventory.room_available(HotelId::new(1), RoomId::new(101)),
            Some(true)
        );
        assert!(matches!(
            orchestrator.get(reservation.id).await,
            Err(BookingError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_cancel_deletes_even_when_release_fails() {
        let (orchestrator, store, inventory, _) = setup();
        let reservation = orchestrator.create(request(Some(101))).await.unwrap();

        inventory.set_fail_on_mutation(true);
        orchestrator.cancel(reservation.id).await.unwrap();

        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_cancel_missing_reservation() {
        let (orchestrator, _, _, _) = setup();

        let result = orchestrator.cancel(ReservationId::new(42)).await;
        assert!(matches!(result, Err(BookingError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_cancel_is_unconditional_after_confirmation() {
        let (orchestrator, store, _, _) = setup();
        let reservation = orchestrator.create(request(Some(101))).await.unwrap();
        orchestrator.confirm_payment(reservation.id).await.unwrap();

        // no guard against cancelling a confirmed reservation
        orchestrator.cancel(reservation.id).await.unwrap();
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_list_projections() {
        let (orchestrator, _, _, identity) = setup();
        identity.add_user_id(UserId::new(2));

        orchestrator.create(request(Some(101))).await.unwrap();
        let mut other = request(None);
        other.user_id = UserId::new(2);
        orchestrator.create(other).await.unwrap();

        assert_eq!(orchestrator.list().await.unwrap().len(), 2);
        assert_eq!(
            orchestrator.list_by_user(UserId::new(1)).await.unwrap().len(),
            1
        );
        assert_eq!(
            orchestrator.list_by_user(UserId::new(9)).await.unwrap().len(),
            0
        );
    }
}
