//! Reservation entity and its value objects.

pub mod status;

use chrono::{DateTime, Utc};
use common::{HotelId, ReservationId, RoomId, UserId};
use serde::{Deserialize, Serialize};

use crate::dates::StayDates;
use crate::money::Money;

pub use status::ReservationStatus;

/// Contact details of the guest the reservation is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub special_requests: Option<String>,
}

/// A persisted reservation, owned exclusively by the reservation
/// orchestrator. Other components reference it only by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub user_id: UserId,
    pub hotel_id: HotelId,
    pub room_id: Option<RoomId>,
    pub stay: StayDates,
    pub guest: GuestContact,
    pub total_price: Money,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Returns the number of nights of the stay.
    pub fn nights(&self) -> i64 {
        self.stay.nights()
    }

    /// Transitions the reservation to `Confirmed`.
    ///
    /// Returns false without mutating when already confirmed, so duplicate
    /// confirmation calls are no-ops.
    pub fn confirm(&mut self) -> bool {
        if self.status.is_confirmed() {
            return false;
        }
        self.status = ReservationStatus::Confirmed;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_reservation() -> Reservation {
        let stay = StayDates::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        )
        .unwrap();

        Reservation {
            id: ReservationId::new(1),
            user_id: UserId::new(1),
            hotel_id: HotelId::new(1),
            room_id: Some(RoomId::new(101)),
            stay,
            guest: GuestContact {
                first_name: "Amina".to_string(),
                last_name: "Benali".to_string(),
                email: "amina@example.com".to_string(),
                phone: "+212 600 000 000".to_string(),
                special_requests: None,
            },
            total_price: Money::from_cents(30000),
            status: ReservationStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_nights_delegates_to_stay() {
        assert_eq!(sample_reservation().nights(), 2);
    }

    #[test]
    fn test_confirm_transitions_once() {
        let mut reservation = sample_reservation();
        assert!(reservation.confirm());
        assert_eq!(reservation.status, ReservationStatus::Confirmed);

        // second call is a no-op
        assert!(!reservation.confirm());
        assert_eq!(reservation.status, ReservationStatus::Confirmed);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let reservation = sample_reservation();
        let json = serde_json::to_string(&reservation).unwrap();
        let back: Reservation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reservation);
    }
}
