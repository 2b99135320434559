//! Persistence layer for the reservation system.
//!
//! Each entity gets its own store trait with per-row atomicity. Two
//! implementations are provided: an in-memory store for tests and local
//! development, and a PostgreSQL store for production. The payment store
//! enforces the at-most-one-non-refunded-payment-per-reservation
//! constraint, so racing payment requests are serialized by the store
//! rather than by in-process locking.

pub mod error;
pub mod memory;
pub mod payment;
pub mod postgres;
pub mod reservation;

pub use error::{Result, StoreError};
pub use memory::{InMemoryPaymentStore, InMemoryReservationStore};
pub use payment::{NewPayment, PaymentStore};
pub use postgres::{PostgresPaymentStore, PostgresReservationStore};
pub use reservation::{NewReservation, ReservationStore};
