//! In-memory store implementations for testing and local development.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{PaymentId, ReservationId, TransactionId, UserId};
use domain::{Payment, PaymentStatus, Reservation};
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::payment::{NewPayment, PaymentStore};
use crate::reservation::{NewReservation, ReservationStore};

#[derive(Debug, Default)]
struct ReservationRows {
    rows: HashMap<i64, Reservation>,
    next_id: i64,
}

/// In-memory reservation store.
///
/// Provides the same interface as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryReservationStore {
    state: Arc<RwLock<ReservationRows>>,
}

impl InMemoryReservationStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of reservations stored.
    pub async fn count(&self) -> usize {
        self.state.read().await.rows.len()
    }

    /// Removes all rows.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.rows.clear();
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn insert(&self, new: NewReservation) -> Result<Reservation> {
        let mut state = self.state.write().await;
        state.next_id += 1;

        let now = Utc::now();
        let reservation = Reservation {
            id: ReservationId::new(state.next_id),
            user_id: new.user_id,
            hotel_id: new.hotel_id,
            room_id: new.room_id,
            stay: new.stay,
            guest: new.guest,
            total_price: new.total_price,
            status: new.status,
            created_at: now,
            updated_at: now,
        };
        let next_id = state.next_id;
        state.rows.insert(next_id, reservation.clone());
        Ok(reservation)
    }

    async fn get(&self, id: ReservationId) -> Result<Option<Reservation>> {
        let state = self.state.read().await;
        Ok(state.rows.get(&id.as_i64()).cloned())
    }

    async fn list(&self) -> Result<Vec<Reservation>> {
        let state = self.state.read().await;
        let mut rows: Vec<_> = state.rows.values().cloned().collect();
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Reservation>> {
        let state = self.state.read().await;
        let mut rows: Vec<_> = state
            .rows
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }

    async fn update(&self, reservation: &Reservation) -> Result<Reservation> {
        let mut state = self.state.write().await;
        let key = reservation.id.as_i64();
        if !state.rows.contains_key(&key) {
            return Err(StoreError::RowNotFound {
                entity: "reservation",
                id: key,
            });
        }
        let mut updated = reservation.clone();
        updated.updated_at = Utc::now();
        state.rows.insert(key, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: ReservationId) -> Result<bool> {
        let mut state = self.state.write().await;
        Ok(state.rows.remove(&id.as_i64()).is_some())
    }
}

#[derive(Debug, Default)]
struct PaymentRows {
    rows: HashMap<i64, Payment>,
    next_id: i64,
}

/// In-memory payment store.
///
/// Enforces the same uniqueness constraint as the PostgreSQL partial
/// unique index: at most one non-refunded payment per reservation.
#[derive(Clone, Default)]
pub struct InMemoryPaymentStore {
    state: Arc<RwLock<PaymentRows>>,
}

impl InMemoryPaymentStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of payments stored.
    pub async fn count(&self) -> usize {
        self.state.read().await.rows.len()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn insert(&self, new: NewPayment) -> Result<Payment> {
        let mut state = self.state.write().await;

        let duplicate = state.rows.values().any(|p| {
            p.reservation_id == new.reservation_id && p.status != PaymentStatus::Refunded
        });
        if duplicate {
            return Err(StoreError::DuplicatePayment(new.reservation_id));
        }

        state.next_id += 1;
        let now = Utc::now();
        let payment = Payment {
            id: PaymentId::new(state.next_id),
            reservation_id: new.reservation_id,
            transaction_id: new.transaction_id,
            amount: new.amount,
            method: new.method,
            card_number: new.card_number,
            card_holder_name: new.card_holder_name,
            card_expiry: new.card_expiry,
            status: new.status,
            created_at: now,
            updated_at: now,
        };
        let next_id = state.next_id;
        state.rows.insert(next_id, payment.clone());
        Ok(payment)
    }

    async fn get(&self, id: PaymentId) -> Result<Option<Payment>> {
        let state = self.state.read().await;
        Ok(state.rows.get(&id.as_i64()).cloned())
    }

    async fn get_by_reservation(&self, reservation_id: ReservationId) -> Result<Option<Payment>> {
        let state = self.state.read().await;
        Ok(state
            .rows
            .values()
            .filter(|p| p.reservation_id == reservation_id)
            .max_by_key(|p| p.id)
            .cloned())
    }

    async fn get_by_transaction(&self, transaction_id: &TransactionId) -> Result<Option<Payment>> {
        let state = self.state.read().await;
        Ok(state
            .rows
            .values()
            .find(|p| &p.transaction_id == transaction_id)
            .cloned())
    }

    async fn update(&self, payment: &Payment) -> Result<Payment> {
        let mut state = self.state.write().await;
        let key = payment.id.as_i64();
        if !state.rows.contains_key(&key) {
            return Err(StoreError::RowNotFound {
                entity: "payment",
                id: key,
            });
        }
        let mut updated = payment.clone();
        updated.updated_at = Utc::now();
        state.rows.insert(key, updated.clone());
        Ok(updated)
    }
}
