//! PostgreSQL-backed store implementations.

use async_trait::async_trait;
use chrono::NaiveDate;
use common::{HotelId, PaymentId, ReservationId, RoomId, TransactionId, UserId};
use domain::{
    GuestContact, Money, Payment, PaymentMethod, PaymentStatus, Reservation, ReservationStatus,
    StayDates,
};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::error::{Result, StoreError};
use crate::payment::{NewPayment, PaymentStore};
use crate::reservation::{NewReservation, ReservationStore};

/// Name of the partial unique index guarding one non-refunded payment per
/// reservation. Kept in sync with the migration.
const PAYMENT_UNIQUENESS_CONSTRAINT: &str = "payments_one_active_per_reservation";

/// Runs the database migrations for both stores.
pub async fn run_migrations(pool: &PgPool) -> std::result::Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// PostgreSQL reservation store.
#[derive(Clone)]
pub struct PostgresReservationStore {
    pool: PgPool,
}

impl PostgresReservationStore {
    /// Creates a store on an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_reservation(row: PgRow) -> Result<Reservation> {
        let check_in: NaiveDate = row.try_get("check_in")?;
        let check_out: NaiveDate = row.try_get("check_out")?;
        let stay = StayDates::new(check_in, check_out)
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        let status_raw: String = row.try_get("status")?;
        let status = ReservationStatus::parse(&status_raw)
            .ok_or_else(|| StoreError::Decode(format!("unknown reservation status {status_raw}")))?;

        Ok(Reservation {
            id: ReservationId::new(row.try_get("id")?),
            user_id: UserId::new(row.try_get("user_id")?),
            hotel_id: HotelId::new(row.try_get("hotel_id")?),
            room_id: row.try_get::<Option<i64>, _>("room_id")?.map(RoomId::new),
            stay,
            guest: GuestContact {
                first_name: row.try_get("first_name")?,
                last_name: row.try_get("last_name")?,
                email: row.try_get("email")?,
                phone: row.try_get("phone")?,
                special_requests: row.try_get("special_requests")?,
            },
            total_price: Money::from_cents(row.try_get("total_price_cents")?),
            status,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

const RESERVATION_COLUMNS: &str = "id, user_id, hotel_id, room_id, check_in, check_out, \
     first_name, last_name, email, phone, special_requests, \
     total_price_cents, status, created_at, updated_at";

#[async_trait]
impl ReservationStore for PostgresReservationStore {
    async fn insert(&self, new: NewReservation) -> Result<Reservation> {
        let query = format!(
            r#"
            INSERT INTO reservations
                (user_id, hotel_id, room_id, check_in, check_out,
                 first_name, last_name, email, phone, special_requests,
                 total_price_cents, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {RESERVATION_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(new.user_id.as_i64())
            .bind(new.hotel_id.as_i64())
            .bind(new.room_id.map(|r| r.as_i64()))
            .bind(new.stay.check_in())
            .bind(new.stay.check_out())
            .bind(&new.guest.first_name)
            .bind(&new.guest.last_name)
            .bind(&new.guest.email)
            .bind(&new.guest.phone)
            .bind(&new.guest.special_requests)
            .bind(new.total_price.cents())
            .bind(new.status.as_str())
            .fetch_one(&self.pool)
            .await?;

        Self::row_to_reservation(row)
    }

    async fn get(&self, id: ReservationId) -> Result<Option<Reservation>> {
        let query = format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_reservation).transpose()
    }

    async fn list(&self) -> Result<Vec<Reservation>> {
        let query = format!("SELECT {RESERVATION_COLUMNS} FROM reservations ORDER BY id");
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_reservation).collect()
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Reservation>> {
        let query = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE user_id = $1 ORDER BY id"
        );
        let rows = sqlx::query(&query)
            .bind(user_id.as_i64())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::row_to_reservation).collect()
    }

    async fn update(&self, reservation: &Reservation) -> Result<Reservation> {
        let query = format!(
            r#"
            UPDATE reservations
            SET status = $2, total_price_cents = $3, updated_at = now()
            WHERE id = $1
            RETURNING {RESERVATION_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(reservation.id.as_i64())
            .bind(reservation.status.as_str())
            .bind(reservation.total_price.cents())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::RowNotFound {
                entity: "reservation",
                id: reservation.id.as_i64(),
            })?;

        Self::row_to_reservation(row)
    }

    async fn delete(&self, id: ReservationId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// PostgreSQL payment store.
///
/// The one-non-refunded-payment-per-reservation invariant is enforced by
/// a partial unique index, so concurrent orchestrator instances cannot
/// both insert for the same reservation.
#[derive(Clone)]
pub struct PostgresPaymentStore {
    pool: PgPool,
}

impl PostgresPaymentStore {
    /// Creates a store on an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_payment(row: PgRow) -> Result<Payment> {
        let status_raw: String = row.try_get("status")?;
        let status = PaymentStatus::parse(&status_raw)
            .ok_or_else(|| StoreError::Decode(format!("unknown payment status {status_raw}")))?;

        let method_raw: String = row.try_get("method")?;
        let method = PaymentMethod::parse(&method_raw)
            .ok_or_else(|| StoreError::Decode(format!("unknown payment method {method_raw}")))?;

        Ok(Payment {
            id: PaymentId::new(row.try_get("id")?),
            reservation_id: ReservationId::new(row.try_get("reservation_id")?),
            transaction_id: TransactionId::new(row.try_get::<String, _>("transaction_id")?),
            amount: Money::from_cents(row.try_get("amount_cents")?),
            method,
            card_number: row.try_get("card_number")?,
            card_holder_name: row.try_get("card_holder_name")?,
            card_expiry: row.try_get("card_expiry")?,
            status,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

const PAYMENT_COLUMNS: &str = "id, reservation_id, transaction_id, amount_cents, method, \
     card_number, card_holder_name, card_expiry, status, created_at, updated_at";

#[async_trait]
impl PaymentStore for PostgresPaymentStore {
    async fn insert(&self, new: NewPayment) -> Result<Payment> {
        let query = format!(
            r#"
            INSERT INTO payments
                (reservation_id, transaction_id, amount_cents, method,
                 card_number, card_holder_name, card_expiry, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PAYMENT_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(new.reservation_id.as_i64())
            .bind(new.transaction_id.as_str())
            .bind(new.amount.cents())
            .bind(new.method.as_str())
            .bind(&new.card_number)
            .bind(&new.card_holder_name)
            .bind(&new.card_expiry)
            .bind(new.status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.constraint() == Some(PAYMENT_UNIQUENESS_CONSTRAINT)
                {
                    return StoreError::DuplicatePayment(new.reservation_id);
                }
                StoreError::Database(e)
            })?;

        Self::row_to_payment(row)
    }

    async fn get(&self, id: PaymentId) -> Result<Option<Payment>> {
        let query = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_payment).transpose()
    }

    async fn get_by_reservation(&self, reservation_id: ReservationId) -> Result<Option<Payment>> {
        let query = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE reservation_id = $1 \
             ORDER BY id DESC LIMIT 1"
        );
        let row = sqlx::query(&query)
            .bind(reservation_id.as_i64())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_payment).transpose()
    }

    async fn get_by_transaction(&self, transaction_id: &TransactionId) -> Result<Option<Payment>> {
        let query = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE transaction_id = $1");
        let row = sqlx::query(&query)
            .bind(transaction_id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_payment).transpose()
    }

    async fn update(&self, payment: &Payment) -> Result<Payment> {
        let query = format!(
            r#"
            UPDATE payments
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING {PAYMENT_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(payment.id.as_i64())
            .bind(payment.status.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::RowNotFound {
                entity: "payment",
                id: payment.id.as_i64(),
            })?;

        Self::row_to_payment(row)
    }
}
