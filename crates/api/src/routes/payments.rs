//! Payment endpoints, including the gateway webhook.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use common::{PaymentId, ReservationId};
use domain::{CardDetails, Money, Payment, PaymentMethod};
use saga::{ProcessPayment, WebhookSignature};
use serde::{Deserialize, Serialize};
use store::{PaymentStore, ReservationStore};

use crate::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct ProcessPaymentRequest {
    pub reservation_id: i64,
    pub amount_cents: i64,
    pub payment_method: Option<String>,
    pub card_number: String,
    pub card_holder_name: Option<String>,
    pub expiry_date: Option<String>,
    pub cvv: String,
}

#[derive(Deserialize)]
struct WebhookEvent {
    event_type: String,
    resource: WebhookResource,
}

#[derive(Deserialize)]
struct WebhookResource {
    reservation_id: i64,
}

// -- Response types --

#[derive(Serialize)]
pub struct PaymentResponse {
    pub success: bool,
    pub message: String,
    pub payment_id: i64,
    pub transaction_id: String,
    pub status: String,
    pub amount_cents: i64,
}

impl PaymentResponse {
    fn from_payment(payment: &Payment, message: &str) -> Self {
        PaymentResponse {
            success: true,
            message: message.to_string(),
            payment_id: payment.id.as_i64(),
            transaction_id: payment.transaction_id.to_string(),
            status: payment.status.to_string(),
            amount_cents: payment.amount.cents(),
        }
    }
}

#[derive(Serialize)]
pub struct PaymentDetailsResponse {
    pub id: i64,
    pub reservation_id: i64,
    pub transaction_id: String,
    pub amount_cents: i64,
    pub method: String,
    pub card_number: Option<String>,
    pub status: String,
}

impl From<&Payment> for PaymentDetailsResponse {
    fn from(payment: &Payment) -> Self {
        PaymentDetailsResponse {
            id: payment.id.as_i64(),
            reservation_id: payment.reservation_id.as_i64(),
            transaction_id: payment.transaction_id.to_string(),
            amount_cents: payment.amount.cents(),
            method: payment.method.to_string(),
            card_number: payment.card_number.clone(),
            status: payment.status.to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct WebhookAck {
    pub success: bool,
    pub message: String,
}

// -- Handlers --

/// POST /payments — process a payment for a reservation.
#[tracing::instrument(skip(state, req))]
pub async fn create<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    Json(req): Json<ProcessPaymentRequest>,
) -> Result<Json<PaymentResponse>, ApiError>
where
    R: ReservationStore + 'static,
    P: PaymentStore + 'static,
{
    let method = match req.payment_method.as_deref() {
        None => None,
        Some(raw) => Some(
            PaymentMethod::parse(raw)
                .ok_or_else(|| ApiError::BadRequest(format!("unknown payment method {raw}")))?,
        ),
    };

    let payment = state
        .payments
        .process_payment(ProcessPayment {
            reservation_id: ReservationId::new(req.reservation_id),
            amount: Money::from_cents(req.amount_cents),
            method,
            card: CardDetails {
                number: req.card_number,
                holder_name: req.card_holder_name,
                expiry: req.expiry_date,
                cvv: req.cvv,
            },
        })
        .await?;

    Ok(Json(PaymentResponse::from_payment(
        &payment,
        "payment processed",
    )))
}

/// GET /payments/:id — fetch a payment by id.
#[tracing::instrument(skip(state))]
pub async fn get<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    Path(id): Path<i64>,
) -> Result<Json<PaymentDetailsResponse>, ApiError>
where
    R: ReservationStore + 'static,
    P: PaymentStore + 'static,
{
    let payment = state.payments.get_payment(PaymentId::new(id)).await?;
    Ok(Json(PaymentDetailsResponse::from(&payment)))
}

/// GET /payments/reservation/:reservation_id — fetch the payment for a
/// reservation.
#[tracing::instrument(skip(state))]
pub async fn get_by_reservation<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    Path(reservation_id): Path<i64>,
) -> Result<Json<PaymentDetailsResponse>, ApiError>
where
    R: ReservationStore + 'static,
    P: PaymentStore + 'static,
{
    let payment = state
        .payments
        .get_payment_by_reservation(ReservationId::new(reservation_id))
        .await?;
    Ok(Json(PaymentDetailsResponse::from(&payment)))
}

/// POST /payments/:id/refund — refund a completed payment.
#[tracing::instrument(skip(state))]
pub async fn refund<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    Path(id): Path<i64>,
) -> Result<Json<PaymentResponse>, ApiError>
where
    R: ReservationStore + 'static,
    P: PaymentStore + 'static,
{
    let payment = state.payments.refund_payment(PaymentId::new(id)).await?;
    Ok(Json(PaymentResponse::from_payment(
        &payment,
        "payment refunded",
    )))
}

/// POST /payments/webhook — gateway callback endpoint.
///
/// The signature is checked by the configured verifier before anything
/// else. Capture-completed events feed the idempotent confirmation path,
/// so redelivered webhooks are harmless.
#[tracing::instrument(skip(state, headers, body))]
pub async fn webhook<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<WebhookAck>, ApiError>
where
    R: ReservationStore + 'static,
    P: PaymentStore + 'static,
{
    let signature = WebhookSignature {
        transmission_id: header_string(&headers, "paypal-transmission-id"),
        timestamp: header_string(&headers, "paypal-transmission-time"),
        signature: header_string(&headers, "paypal-transmission-sig"),
    };

    if !state.verifier.verify(&signature, &body) {
        tracing::warn!(
            transmission_id = %signature.transmission_id,
            "rejected webhook with bad signature"
        );
        return Err(ApiError::Unauthorized(
            "webhook signature verification failed".to_string(),
        ));
    }

    let event: WebhookEvent = serde_json::from_str(&body)
        .map_err(|e| ApiError::BadRequest(format!("malformed webhook body: {e}")))?;

    if event.event_type == "PAYMENT.CAPTURE.COMPLETED" {
        state
            .reservations
            .confirm_payment(ReservationId::new(event.resource.reservation_id))
            .await?;
        return Ok(Json(WebhookAck {
            success: true,
            message: "reservation confirmed".to_string(),
        }));
    }

    tracing::info!(event_type = %event.event_type, "ignoring webhook event");
    Ok(Json(WebhookAck {
        success: true,
        message: "event ignored".to_string(),
    }))
}

fn header_string(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
