//! Reservation store contract.

use async_trait::async_trait;
use common::{HotelId, ReservationId, RoomId, UserId};
use domain::{GuestContact, Money, Reservation, ReservationStatus, StayDates};

use crate::error::Result;

/// A reservation that has not been persisted yet.
///
/// The store assigns the id and timestamps on insert.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub user_id: UserId,
    pub hotel_id: HotelId,
    pub room_id: Option<RoomId>,
    pub stay: StayDates,
    pub guest: GuestContact,
    pub total_price: Money,
    pub status: ReservationStatus,
}

/// Store for reservation rows.
///
/// Implementations must provide per-row atomicity: each insert, update,
/// and delete is a single transactional unit.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Persists a new reservation, assigning its id and timestamps.
    async fn insert(&self, new: NewReservation) -> Result<Reservation>;

    /// Fetches a reservation by id.
    async fn get(&self, id: ReservationId) -> Result<Option<Reservation>>;

    /// Lists all reservations, oldest first.
    async fn list(&self) -> Result<Vec<Reservation>>;

    /// Lists the reservations made by a user, oldest first.
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Reservation>>;

    /// Writes back a mutated reservation, refreshing `updated_at`.
    ///
    /// Fails with [`StoreError::RowNotFound`] when the row is gone.
    ///
    /// [`StoreError::RowNotFound`]: crate::StoreError::RowNotFound
    async fn update(&self, reservation: &Reservation) -> Result<Reservation>;

    /// Deletes a reservation row. Returns false when it did not exist.
    async fn delete(&self, id: ReservationId) -> Result<bool>;
}
