//! Collaborator contracts consumed by the orchestrators.
//!
//! Every remote dependency is a trait with two implementations: an
//! in-memory double with failure injection for tests and local runs, and
//! an HTTP client with a bounded request timeout for deployments.

pub mod confirmation;
pub mod gateway;
pub mod identity;
pub mod inventory;
pub mod verifier;

pub use confirmation::{
    HttpReservationConfirmer, LocalConfirmer, RecordingConfirmer, ReservationConfirmer,
};
pub use gateway::{CaptureOutcome, ChargeRequest, PaymentGateway, RestGateway, SimulatedGateway};
pub use identity::{HttpIdentityService, IdentityService, InMemoryIdentityService, UserRecord};
pub use inventory::{
    HotelRecord, HttpInventoryService, InMemoryInventoryService, InventoryService, RoomRecord,
};
pub use verifier::{AcceptAllVerifier, Sha256Verifier, WebhookSignature, WebhookVerifier};
