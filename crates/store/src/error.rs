use common::ReservationId;
use thiserror::Error;

/// Errors that can occur when interacting with an entity store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The row targeted by an update or delete does not exist.
    #[error("{entity} not found: {id}")]
    RowNotFound { entity: &'static str, id: i64 },

    /// A non-refunded payment already exists for the reservation.
    #[error("a payment already exists for reservation {0}")]
    DuplicatePayment(ReservationId),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored row could not be decoded into its entity.
    #[error("corrupt row: {0}")]
    Decode(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
