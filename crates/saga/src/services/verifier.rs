//! Gateway webhook signature verification.
//!
//! Two variants exist and the deployment picks one through configuration:
//! [`AcceptAllVerifier`] for development, which accepts every signature
//! and says so loudly in the logs, and [`Sha256Verifier`] for production,
//! which checks a keyed digest. Accepting unverified webhooks in a real
//! deployment lets anyone confirm arbitrary reservations.

use sha2::{Digest, Sha256};

/// Signature material delivered alongside a webhook request.
#[derive(Debug, Clone)]
pub struct WebhookSignature {
    pub transmission_id: String,
    pub timestamp: String,
    pub signature: String,
}

/// Trait for webhook signature verification.
pub trait WebhookVerifier: Send + Sync {
    /// Returns true when the signature matches the body.
    fn verify(&self, signature: &WebhookSignature, body: &str) -> bool;
}

/// Development verifier: accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllVerifier;

impl WebhookVerifier for AcceptAllVerifier {
    fn verify(&self, _signature: &WebhookSignature, _body: &str) -> bool {
        tracing::warn!("webhook signature verification skipped (accept-all verifier active)");
        true
    }
}

/// Production verifier: keyed SHA-256 over the transmission id,
/// timestamp, and body, hex-encoded.
#[derive(Debug, Clone)]
pub struct Sha256Verifier {
    secret: String,
}

impl Sha256Verifier {
    /// Creates a verifier with the shared webhook secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Computes the expected signature for a message.
    pub fn sign(&self, transmission_id: &str, timestamp: &str, body: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(b"|");
        hasher.update(transmission_id.as_bytes());
        hasher.update(b"|");
        hasher.update(timestamp.as_bytes());
        hasher.update(b"|");
        hasher.update(body.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl WebhookVerifier for Sha256Verifier {
    fn verify(&self, signature: &WebhookSignature, body: &str) -> bool {
        let expected = self.sign(&signature.transmission_id, &signature.timestamp, body);
        constant_time_eq(expected.as_bytes(), signature.signature.as_bytes())
    }
}

/// Byte comparison that does not short-circuit on the first mismatch.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature(sig: &str) -> WebhookSignature {
        WebhookSignature {
            transmission_id: "tx-1".to_string(),
            timestamp: "2024-06-01T00:00:00Z".to_string(),
            signature: sig.to_string(),
        }
    }

    #[test]
    fn test_accept_all_accepts_garbage() {
        let verifier = AcceptAllVerifier;
        assert!(verifier.verify(&signature("nonsense"), "{}"));
    }

    #[test]
    fn test_sha256_accepts_valid_signature() {
        let verifier = Sha256Verifier::new("secret");
        let body = r#"{"event_type":"PAYMENT.CAPTURE.COMPLETED"}"#;
        let sig = verifier.sign("tx-1", "2024-06-01T00:00:00Z", body);

        assert!(verifier.verify(&signature(&sig), body));
    }

    #[test]
    fn test_sha256_rejects_tampered_body() {
        let verifier = Sha256Verifier::new("secret");
        let sig = verifier.sign("tx-1", "2024-06-01T00:00:00Z", "original");

        assert!(!verifier.verify(&signature(&sig), "tampered"));
    }

    #[test]
    fn test_sha256_rejects_wrong_secret() {
        let signer = Sha256Verifier::new("secret-a");
        let verifier = Sha256Verifier::new("secret-b");
        let sig = signer.sign("tx-1", "2024-06-01T00:00:00Z", "{}");

        assert!(!verifier.verify(&signature(&sig), "{}"));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }
}
