//! Reservation confirmation callback trait and implementations.
//!
//! Invoked by the payment orchestrator after a successful charge. The
//! callee's transition is idempotent, so this is the one outbound call
//! that retry-with-backoff is safe for.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use common::ReservationId;
use store::ReservationStore;

use crate::error::BookingError;
use crate::remote::{RemoteError, check_status};
use crate::reservation::ReservationOrchestrator;
use crate::services::identity::IdentityService;
use crate::services::inventory::InventoryService;

/// Trait for the reservation confirmation callback.
#[async_trait]
pub trait ReservationConfirmer: Send + Sync {
    /// Confirms the reservation; safe to call more than once.
    async fn confirm(&self, reservation_id: ReservationId) -> Result<(), RemoteError>;
}

#[derive(Debug, Default)]
struct RecordingConfirmerState {
    confirmed: Vec<ReservationId>,
    fail_on_confirm: bool,
}

/// Recording confirmer for tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingConfirmer {
    state: Arc<RwLock<RecordingConfirmerState>>,
}

impl RecordingConfirmer {
    /// Creates a confirmer that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the confirmer to fail as if unreachable.
    pub fn set_fail_on_confirm(&self, fail: bool) {
        self.state.write().unwrap().fail_on_confirm = fail;
    }

    /// Returns the number of confirmations received.
    pub fn confirmation_count(&self) -> usize {
        self.state.read().unwrap().confirmed.len()
    }

    /// Returns true if the reservation was confirmed at least once.
    pub fn was_confirmed(&self, reservation_id: ReservationId) -> bool {
        self.state
            .read()
            .unwrap()
            .confirmed
            .contains(&reservation_id)
    }
}

#[async_trait]
impl ReservationConfirmer for RecordingConfirmer {
    async fn confirm(&self, reservation_id: ReservationId) -> Result<(), RemoteError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_confirm {
            return Err(RemoteError::unavailable("reservation service down"));
        }
        state.confirmed.push(reservation_id);
        Ok(())
    }
}

/// In-process confirmer wrapping the reservation orchestrator directly.
///
/// Used when both orchestrators run in one deployment unit; the error
/// translation mirrors what an HTTP hop would produce.
pub struct LocalConfirmer<R, U, I> {
    reservations: Arc<ReservationOrchestrator<R, U, I>>,
}

impl<R, U, I> LocalConfirmer<R, U, I> {
    /// Creates a confirmer over a shared reservation orchestrator.
    pub fn new(reservations: Arc<ReservationOrchestrator<R, U, I>>) -> Self {
        Self { reservations }
    }
}

#[async_trait]
impl<R, U, I> ReservationConfirmer for LocalConfirmer<R, U, I>
where
    R: ReservationStore,
    U: IdentityService,
    I: InventoryService,
{
    async fn confirm(&self, reservation_id: ReservationId) -> Result<(), RemoteError> {
        match self.reservations.confirm_payment(reservation_id).await {
            Ok(_) => Ok(()),
            Err(BookingError::NotFound { .. }) => Err(RemoteError::NotFound),
            Err(other) => Err(RemoteError::unavailable(other)),
        }
    }
}

/// HTTP confirmer posting to the reservation service's confirm endpoint.
#[derive(Debug, Clone)]
pub struct HttpReservationConfirmer {
    client: reqwest::Client,
    base_url: String,
    max_retries: usize,
}

impl HttpReservationConfirmer {
    /// Creates a client with a bounded per-request timeout and a default
    /// retry budget of three attempts.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            base_url: base_url.into(),
            max_retries: 3,
        })
    }

    async fn post_confirm(&self, reservation_id: ReservationId) -> Result<(), RemoteError> {
        let url = format!(
            "{}/api/reservations/{reservation_id}/confirm-payment",
            self.base_url
        );
        let response = self.client.post(&url).send().await?;
        check_status(response)?;
        Ok(())
    }
}

#[async_trait]
impl ReservationConfirmer for HttpReservationConfirmer {
    async fn confirm(&self, reservation_id: ReservationId) -> Result<(), RemoteError> {
        // Retrying is safe because the confirm transition is idempotent.
        // A NotFound answer is definitive and not retried.
        (|| self.post_confirm(reservation_id))
            .retry(ExponentialBuilder::default().with_max_times(self.max_retries))
            .when(|e| matches!(e, RemoteError::Unavailable { .. }))
            .await
    }
}
