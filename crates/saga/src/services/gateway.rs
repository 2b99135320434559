//! Payment gateway trait and implementations.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use common::{ReservationId, TransactionId};
use domain::{CardDetails, Money};

use crate::remote::RemoteError;

/// A charge to capture through the gateway.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub reservation_id: ReservationId,
    pub amount: Money,
    /// Sent as the gateway idempotency key so a retried create cannot
    /// produce a second order.
    pub transaction_id: TransactionId,
    pub card: CardDetails,
}

/// Outcome of a gateway capture attempt.
///
/// Transport failures are a separate channel (`RemoteError`); the caller
/// maps both declines and transport failures to a `FAILED` payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Approved,
    Declined { reason: String },
}

/// Trait for capturing charges.
///
/// Card sanity rules (number length, CVV length) are the caller's
/// pre-check, not part of this contract.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Attempts to capture the charge.
    async fn capture(&self, charge: &ChargeRequest) -> Result<CaptureOutcome, RemoteError>;
}

#[derive(Debug, Default)]
struct SimulatedGatewayState {
    decline_next: bool,
    fail_on_capture: bool,
    capture_count: u32,
}

/// Deterministic gateway simulation for tests and local development.
///
/// Approves every charge unless told otherwise; there is no random
/// failure rate, so test outcomes are reproducible.
#[derive(Debug, Clone, Default)]
pub struct SimulatedGateway {
    state: Arc<RwLock<SimulatedGatewayState>>,
}

impl SimulatedGateway {
    /// Creates a gateway that approves everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to decline charges.
    pub fn set_decline(&self, decline: bool) {
        self.state.write().unwrap().decline_next = decline;
    }

    /// Configures the gateway to fail at the transport level.
    pub fn set_fail_on_capture(&self, fail: bool) {
        self.state.write().unwrap().fail_on_capture = fail;
    }

    /// Returns the number of capture attempts that reached the gateway.
    pub fn capture_count(&self) -> u32 {
        self.state.read().unwrap().capture_count
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn capture(&self, _charge: &ChargeRequest) -> Result<CaptureOutcome, RemoteError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_capture {
            return Err(RemoteError::unavailable("gateway timeout"));
        }
        state.capture_count += 1;
        if state.decline_next {
            return Ok(CaptureOutcome::Declined {
                reason: "card declined".to_string(),
            });
        }
        Ok(CaptureOutcome::Approved)
    }
}

/// REST gateway speaking a PayPal-style checkout API: client-credentials
/// token, order create with an idempotency key, then capture.
#[derive(Debug, Clone)]
pub struct RestGateway {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

impl RestGateway {
    /// Creates a gateway client with a bounded per-request timeout.
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            base_url: base_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        })
    }

    async fn access_token(&self) -> Result<String, RemoteError> {
        let response = self
            .client
            .post(format!("{}/v1/oauth2/token", self.base_url))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let body: serde_json::Value = crate::remote::check_status(response)?.json().await?;
        body["access_token"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| RemoteError::unavailable("token response missing access_token"))
    }

    async fn create_order(
        &self,
        token: &str,
        charge: &ChargeRequest,
    ) -> Result<String, RemoteError> {
        let amount = format!("{}.{:02}", charge.amount.dollars(), charge.amount.cents_part());
        let body = serde_json::json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "amount": { "currency_code": "EUR", "value": amount }
            }]
        });

        let response = self
            .client
            .post(format!("{}/v2/checkout/orders", self.base_url))
            .bearer_auth(token)
            .header("PayPal-Request-Id", charge.transaction_id.as_str())
            .json(&body)
            .send()
            .await?;

        let order: serde_json::Value = crate::remote::check_status(response)?.json().await?;
        order["id"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| RemoteError::unavailable("order response missing id"))
    }

    async fn capture_order(&self, token: &str, order_id: &str) -> Result<CaptureOutcome, RemoteError> {
        let response = self
            .client
            .post(format!(
                "{}/v2/checkout/orders/{order_id}/capture",
                self.base_url
            ))
            .bearer_auth(token)
            .send()
            .await?;

        let body: serde_json::Value = crate::remote::check_status(response)?.json().await?;
        match body["status"].as_str() {
            Some("COMPLETED") => Ok(CaptureOutcome::Approved),
            Some(other) => Ok(CaptureOutcome::Declined {
                reason: format!("capture status {other}"),
            }),
            None => Err(RemoteError::unavailable("capture response missing status")),
        }
    }
}

#[async_trait]
impl PaymentGateway for RestGateway {
    async fn capture(&self, charge: &ChargeRequest) -> Result<CaptureOutcome, RemoteError> {
        let token = self.access_token().await?;
        let order_id = self.create_order(&token, charge).await?;
        self.capture_order(&token, &order_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn charge() -> ChargeRequest {
        ChargeRequest {
            reservation_id: ReservationId::new(1),
            amount: Money::from_cents(30000),
            transaction_id: TransactionId::new("TXN-0001"),
            card: CardDetails {
                number: "4111111111111111".to_string(),
                holder_name: None,
                expiry: None,
                cvv: "123".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_approves_by_default() {
        let gateway = SimulatedGateway::new();
        let outcome = gateway.capture(&charge()).await.unwrap();
        assert_eq!(outcome, CaptureOutcome::Approved);
        assert_eq!(gateway.capture_count(), 1);
    }

    #[tokio::test]
    async fn test_decline() {
        let gateway = SimulatedGateway::new();
        gateway.set_decline(true);

        let outcome = gateway.capture(&charge()).await.unwrap();
        assert!(matches!(outcome, CaptureOutcome::Declined { .. }));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let gateway = SimulatedGateway::new();
        gateway.set_fail_on_capture(true);

        let result = gateway.capture(&charge()).await;
        assert!(matches!(result, Err(RemoteError::Unavailable { .. })));
        assert_eq!(gateway.capture_count(), 0);
    }
}
