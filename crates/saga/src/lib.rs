//! Booking saga for the reservation system.
//!
//! Coordinates a booking across four independently-owned services —
//! identity, inventory, reservation, payment — that talk only over
//! synchronous calls, with no shared database and no transaction
//! coordinator. The flow:
//!
//! 1. Create: validate the request against identity and inventory,
//!    persist a `PENDING` reservation, then hold the room best-effort.
//! 2. Pay: validate and charge through the gateway, persist the payment
//!    in a terminal status, then confirm the reservation best-effort.
//! 3. Cancel: release the room best-effort, then delete the reservation.
//!
//! Each primary persistence write is the atomicity boundary. Cross-service
//! side effects are detached, logged, best-effort operations, and the
//! confirmation callback is idempotent so retries are always safe.

pub mod error;
pub mod ids;
pub mod payment;
pub mod remote;
pub mod reservation;
pub mod services;

pub use error::BookingError;
pub use ids::{SequentialTransactionIds, TransactionIdGenerator, UuidTransactionIds};
pub use payment::{PaymentOrchestrator, ProcessPayment};
pub use remote::RemoteError;
pub use reservation::{CreateReservation, DEFAULT_NIGHTLY_RATE, ReservationOrchestrator};
pub use services::{
    AcceptAllVerifier, CaptureOutcome, ChargeRequest, HotelRecord, HttpIdentityService,
    HttpInventoryService, HttpReservationConfirmer, IdentityService, InMemoryIdentityService,
    InMemoryInventoryService, InventoryService, LocalConfirmer, PaymentGateway,
    RecordingConfirmer, ReservationConfirmer, RestGateway, RoomRecord, Sha256Verifier,
    SimulatedGateway, UserRecord, WebhookSignature, WebhookVerifier,
};
