//! Domain layer for the reservation system.
//!
//! Holds the two entities the orchestrators own — [`Reservation`] and
//! [`Payment`] — together with their status state machines and the value
//! objects shared between them. Everything here is plain data with local
//! invariants; remote collaborators and persistence live in other crates.

pub mod dates;
pub mod error;
pub mod money;
pub mod payment;
pub mod reservation;

pub use dates::StayDates;
pub use error::DomainError;
pub use money::Money;
pub use payment::{CardDetails, Payment, PaymentMethod, PaymentStatus, mask_card_number};
pub use reservation::{GuestContact, Reservation, ReservationStatus};
