//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use saga::BookingError;

/// API-level error type that maps to HTTP responses.
///
/// Every failure renders as `{"success": false, "message": "..."}`.
/// Internal faults are translated to a generic message; raw store or
/// serialization detail never reaches the client.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Webhook signature rejected.
    Unauthorized(String),
    /// Orchestrator error.
    Booking(BookingError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Booking(err) => booking_error_to_response(err),
        };

        let body = serde_json::json!({ "success": false, "message": message });
        (status, axum::Json(body)).into_response()
    }
}

fn booking_error_to_response(err: BookingError) -> (StatusCode, String) {
    match &err {
        BookingError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        BookingError::ReferenceNotFound { .. } | BookingError::NotFound { .. } => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        BookingError::DuplicatePayment(_) | BookingError::InvalidState { .. } => {
            (StatusCode::CONFLICT, err.to_string())
        }
        BookingError::UpstreamUnavailable { .. } => (StatusCode::BAD_GATEWAY, err.to_string()),
        BookingError::Store(inner) => {
            tracing::error!(error = %inner, "store failure while handling request");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            )
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        ApiError::Booking(err)
    }
}
