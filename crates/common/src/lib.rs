//! Shared types used across the reservation system crates.

pub mod types;

pub use types::{HotelId, PaymentId, ReservationId, RoomId, TransactionId, UserId};
