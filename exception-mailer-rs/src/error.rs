//! Error handling for the exception mailer
//!
//! Internal fallible steps use `MailerError`; none of them escape the
//! public `notify` operation, which degrades to a `NotifyOutcome` instead.

use thiserror::Error;

/// Result type for exception mailer operations
pub type Result<T, E = MailerError> = std::result::Result<T, E>;

/// Main error type for the exception mailer
#[derive(Error, Debug)]
pub enum MailerError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Recipient address failed validation
    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),

    /// Mail transport errors
    #[error("Mail transport error: {0}")]
    Transport(String),

    /// Suppression cache encode/decode errors
    #[error("Suppression cache error: {0}")]
    CacheCodec(String),

    /// Malformed signature string
    #[error("Malformed signature: {0}")]
    MalformedSignature(String),
}

impl MailerError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        MailerError::Configuration(message.into())
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        MailerError::Transport(message.into())
    }

    /// Create a cache codec error
    pub fn cache_codec(message: impl Into<String>) -> Self {
        MailerError::CacheCodec(message.into())
    }
}
