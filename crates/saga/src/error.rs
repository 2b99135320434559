//! Booking error taxonomy.

use common::ReservationId;
use domain::DomainError;
use store::StoreError;
use thiserror::Error;

/// Errors surfaced by the orchestrators.
///
/// The taxonomy separates client errors (invalid input, missing
/// references, business-rule violations) from server-side failures
/// (unreachable collaborators, store faults). Best-effort side effects
/// never produce any of these; their failures stay inside the operation
/// that triggered them.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Malformed or missing request fields, bad date ordering, or a
    /// non-positive amount. Never retried.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A referenced user, hotel, or room does not exist upstream.
    #[error("{entity} not found: {id}")]
    ReferenceNotFound { entity: &'static str, id: i64 },

    /// A direct entity lookup by id found nothing.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// A payment already exists for the reservation.
    #[error("a payment already exists for reservation {0}")]
    DuplicatePayment(ReservationId),

    /// The entity is not in a state that permits the operation.
    #[error("invalid state: expected {expected}, actual {actual}")]
    InvalidState { expected: String, actual: String },

    /// A required remote collaborator is unreachable or erroring.
    #[error("{service} service unavailable: {reason}")]
    UpstreamUnavailable {
        service: &'static str,
        reason: String,
    },

    /// The orchestrator's own store failed.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<DomainError> for BookingError {
    fn from(err: DomainError) -> Self {
        // All domain validation failures are client errors.
        BookingError::InvalidRequest(err.to_string())
    }
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicatePayment(id) => BookingError::DuplicatePayment(id),
            StoreError::RowNotFound { entity, id } => BookingError::NotFound { entity, id },
            other => BookingError::Store(other),
        }
    }
}

/// Convenience type alias for orchestrator results.
pub type Result<T> = std::result::Result<T, BookingError>;
