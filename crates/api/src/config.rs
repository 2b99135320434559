//! Application configuration loaded from environment variables.

use saga::{AcceptAllVerifier, Sha256Verifier, WebhookVerifier};

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `WEBHOOK_VERIFIER` — `"accept-all"` or `"sha256"` (default: `"accept-all"`)
/// - `WEBHOOK_SECRET` — shared secret, required for `"sha256"`
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub webhook_verifier: String,
    pub webhook_secret: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            webhook_verifier: std::env::var("WEBHOOK_VERIFIER")
                .unwrap_or_else(|_| "accept-all".to_string()),
            webhook_secret: std::env::var("WEBHOOK_SECRET").ok(),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds the configured webhook verifier.
    ///
    /// Falls back to accept-all (with a warning) when `sha256` is
    /// requested without a secret, so a misconfigured deployment fails
    /// loud instead of silently rejecting every webhook.
    pub fn verifier(&self) -> Box<dyn WebhookVerifier> {
        match (self.webhook_verifier.as_str(), &self.webhook_secret) {
            ("sha256", Some(secret)) => Box::new(Sha256Verifier::new(secret.clone())),
            ("sha256", None) => {
                tracing::warn!("WEBHOOK_VERIFIER=sha256 but WEBHOOK_SECRET unset, accepting all");
                Box::new(AcceptAllVerifier)
            }
            _ => Box::new(AcceptAllVerifier),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            webhook_verifier: "accept-all".to_string(),
            webhook_secret: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.webhook_verifier, "accept-all");
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_sha256_verifier_needs_secret() {
        let config = Config {
            webhook_verifier: "sha256".to_string(),
            webhook_secret: None,
            ..Config::default()
        };
        // falls back to accept-all, which accepts anything
        let verifier = config.verifier();
        let signature = saga::WebhookSignature {
            transmission_id: "t".to_string(),
            timestamp: "now".to_string(),
            signature: "bogus".to_string(),
        };
        assert!(verifier.verify(&signature, "{}"));
    }
}
