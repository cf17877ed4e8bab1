//! Mail transport seam
//!
//! Delivery is abstracted behind the `MailTransport` trait so the notifier
//! can be exercised without a mail system. The bundled implementation posts
//! the message as JSON to an HTTP mail relay.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MailerError, Result};

/// A fully rendered mail ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    /// Recipient address
    pub to: String,

    /// Sender, as a display-name/address pair
    pub from: String,

    /// Subject line
    pub subject: String,

    /// Plain-text body, already word-wrapped
    pub body: String,

    /// Ordered (name, value) header pairs
    pub headers: Vec<(String, String)>,
}

/// Trait for mail delivery backends
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// The transport name (e.g. "http-relay")
    fn name(&self) -> &str;

    /// Deliver a message. An `Err` means the message was not accepted.
    async fn send(&self, message: &MailMessage) -> Result<()>;
}

/// Configuration for the HTTP relay transport
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Relay endpoint the message is posted to
    pub endpoint: String,

    /// Bearer token for the relay, if it requires one
    pub auth_token: Option<String>,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            auth_token: None,
            timeout_seconds: 10,
        }
    }
}

impl RelayConfig {
    /// Create a config for the given endpoint with default settings.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Set the bearer token.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Validate this configuration.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(MailerError::configuration("Relay endpoint is required"));
        }
        Ok(())
    }
}

/// Mail transport that posts messages to an HTTP relay as JSON.
pub struct HttpRelayTransport {
    config: RelayConfig,
    http_client: reqwest::Client,
}

impl HttpRelayTransport {
    /// Create a new relay transport.
    pub fn new(config: RelayConfig) -> Result<Self> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| MailerError::transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }
}

#[async_trait]
impl MailTransport for HttpRelayTransport {
    fn name(&self) -> &str {
        "http-relay"
    }

    async fn send(&self, message: &MailMessage) -> Result<()> {
        let mut request = self.http_client.post(&self.config.endpoint).json(message);

        if let Some(token) = &self.config.auth_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| MailerError::transport(format!("Relay request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(MailerError::transport(format!(
                "Relay returned status {}",
                response.status()
            )));
        }

        debug!(to = %message.to, "message accepted by relay");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_config_validation() {
        assert!(RelayConfig::default().validate().is_err());
        assert!(RelayConfig::new("http://relay.local/send").validate().is_ok());
    }

    #[test]
    fn test_relay_config_builders() {
        let config = RelayConfig::new("http://relay.local/send")
            .with_auth_token("secret")
            .with_timeout_seconds(3);

        assert_eq!(config.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.timeout_seconds, 3);
    }
}
