//! Reservation endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::NaiveDate;
use common::{HotelId, ReservationId, RoomId, UserId};
use domain::{GuestContact, Reservation};
use saga::CreateReservation;
use serde::{Deserialize, Serialize};
use store::{PaymentStore, ReservationStore};

use crate::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateReservationRequest {
    pub user_id: i64,
    pub hotel_id: i64,
    pub room_id: Option<i64>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub special_requests: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct ReservationResponse {
    pub id: i64,
    pub user_id: i64,
    pub hotel_id: i64,
    pub room_id: Option<i64>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: i64,
    pub total_price_cents: i64,
    pub status: String,
}

impl From<&Reservation> for ReservationResponse {
    fn from(reservation: &Reservation) -> Self {
        ReservationResponse {
            id: reservation.id.as_i64(),
            user_id: reservation.user_id.as_i64(),
            hotel_id: reservation.hotel_id.as_i64(),
            room_id: reservation.room_id.map(|r| r.as_i64()),
            check_in: reservation.stay.check_in(),
            check_out: reservation.stay.check_out(),
            nights: reservation.nights(),
            total_price_cents: reservation.total_price.cents(),
            status: reservation.status.to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct ReservationCreatedResponse {
    pub success: bool,
    pub message: String,
    pub reservation: ReservationResponse,
}

#[derive(Serialize)]
pub struct CancelledResponse {
    pub success: bool,
    pub message: String,
}

// -- Handlers --

/// POST /reservations — create a reservation.
#[tracing::instrument(skip(state, req))]
pub async fn create<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    Json(req): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ReservationCreatedResponse>), ApiError>
where
    R: ReservationStore + 'static,
    P: PaymentStore + 'static,
{
    let reservation = state
        .reservations
        .create(CreateReservation {
            user_id: UserId::new(req.user_id),
            hotel_id: HotelId::new(req.hotel_id),
            room_id: req.room_id.map(RoomId::new),
            check_in: req.check_in,
            check_out: req.check_out,
            guest: GuestContact {
                first_name: req.first_name,
                last_name: req.last_name,
                email: req.email,
                phone: req.phone,
                special_requests: req.special_requests,
            },
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ReservationCreatedResponse {
            success: true,
            message: "reservation created".to_string(),
            reservation: ReservationResponse::from(&reservation),
        }),
    ))
}

/// GET /reservations — list all reservations.
#[tracing::instrument(skip(state))]
pub async fn list<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
) -> Result<Json<Vec<ReservationResponse>>, ApiError>
where
    R: ReservationStore + 'static,
    P: PaymentStore + 'static,
{
    let reservations = state.reservations.list().await?;
    Ok(Json(
        reservations.iter().map(ReservationResponse::from).collect(),
    ))
}

/// GET /reservations/:id — fetch a reservation by id.
#[tracing::instrument(skip(state))]
pub async fn get<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    Path(id): Path<i64>,
) -> Result<Json<ReservationResponse>, ApiError>
where
    R: ReservationStore + 'static,
    P: PaymentStore + 'static,
{
    let reservation = state.reservations.get(ReservationId::new(id)).await?;
    Ok(Json(ReservationResponse::from(&reservation)))
}

/// GET /reservations/user/:user_id — list a user's reservations.
#[tracing::instrument(skip(state))]
pub async fn list_by_user<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<ReservationResponse>>, ApiError>
where
    R: ReservationStore + 'static,
    P: PaymentStore + 'static,
{
    let reservations = state
        .reservations
        .list_by_user(UserId::new(user_id))
        .await?;
    Ok(Json(
        reservations.iter().map(ReservationResponse::from).collect(),
    ))
}

/// POST /reservations/:id/confirm-payment — idempotent confirmation
/// callback, invoked by the payment side after a successful charge.
#[tracing::instrument(skip(state))]
pub async fn confirm_payment<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    Path(id): Path<i64>,
) -> Result<Json<ReservationResponse>, ApiError>
where
    R: ReservationStore + 'static,
    P: PaymentStore + 'static,
{
    let reservation = state
        .reservations
        .confirm_payment(ReservationId::new(id))
        .await?;
    Ok(Json(ReservationResponse::from(&reservation)))
}

/// DELETE /reservations/:id — cancel a reservation.
#[tracing::instrument(skip(state))]
pub async fn cancel<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    Path(id): Path<i64>,
) -> Result<Json<CancelledResponse>, ApiError>
where
    R: ReservationStore + 'static,
    P: PaymentStore + 'static,
{
    state.reservations.cancel(ReservationId::new(id)).await?;
    Ok(Json(CancelledResponse {
        success: true,
        message: format!("reservation {id} cancelled"),
    }))
}
