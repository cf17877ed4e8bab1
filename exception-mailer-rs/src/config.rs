//! Configuration for the exception mailer
//!
//! Two distinct seams live here. `ConfigProvider` is the read-only source
//! of panel settings (admin address, base host) used to build typed config
//! structs. `ConfigStore` is the mutable key/value mapping the suppression
//! cache is persisted through between process invocations; values are
//! opaque string blobs, the encoding lives at the cache boundary.

use std::collections::HashMap;
use std::env;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{MailerError, Result};

/// Key the serialized suppression cache is stored under.
pub const SUPPRESSIONS_KEY: &str = "exception_mailer.suppressions";

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

/// Returns true if `addr` is a well-formed email address.
pub fn is_valid_email(addr: &str) -> bool {
    EMAIL_PATTERN.is_match(addr)
}

/// Base trait for configuration providers
pub trait ConfigProvider: Send + Sync {
    /// Get a string configuration value
    fn get_string(&self, key: &str) -> Result<String>;

    /// Get a string configuration value with a default
    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|_| default.to_string())
    }
}

/// Environment variable based configuration provider
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider {
    /// Optional prefix for environment variables
    prefix: Option<String>,
}

impl EnvConfigProvider {
    /// Create a new environment variable config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a prefix for environment variables
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Format a configuration key as an environment variable
    fn format_key(&self, key: &str) -> String {
        let mut env_key = String::new();

        if let Some(ref prefix) = self.prefix {
            env_key.push_str(prefix);
            env_key.push('_');
        }

        env_key.push_str(&key.to_uppercase().replace(|c: char| !c.is_ascii_alphanumeric(), "_"));
        env_key
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        let env_key = self.format_key(key);

        env::var(&env_key).map_err(|e| match e {
            env::VarError::NotPresent => {
                MailerError::configuration(format!("Environment variable not set: {}", env_key))
            }
            env::VarError::NotUnicode(_) => MailerError::configuration(format!(
                "Environment variable is not valid unicode: {}",
                env_key
            )),
        })
    }
}

/// In-memory config provider for testing or static configuration
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigProvider {
    /// Configuration values
    values: HashMap<String, String>,
}

impl MemoryConfigProvider {
    /// Create a new empty memory config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a configuration value
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: ToString,
    {
        self.values.insert(key.into(), value.to_string());
    }
}

impl ConfigProvider for MemoryConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| MailerError::configuration(format!("Configuration key not found: {}", key)))
    }
}

/// Mutable key/value mapping backed by durable panel configuration.
///
/// The mailer reads and writes exactly one key (`SUPPRESSIONS_KEY`); values
/// are opaque blobs. Absence of a store is tolerated by the notifier; the
/// caller simply starts from an empty cache each time.
pub trait ConfigStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: String);
}

/// In-memory config store for testing or single-process use
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    values: HashMap<String, String>,
}

impl MemoryConfigStore {
    /// Create a new empty memory config store
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }
}

/// Admin contact the notifier delivers to.
///
/// The sender address is derived from the configured base host; the
/// recipient comes straight from panel configuration and is validated at
/// notification time, not load time: a malformed address is a silent
/// no-op, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminContact {
    /// Recipient address for exception notifications
    pub recipient: String,

    /// Base host the sender address is derived from
    pub base_host: String,
}

impl AdminContact {
    /// Create a contact from explicit values.
    pub fn new(recipient: impl Into<String>, base_host: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            base_host: base_host.into(),
        }
    }

    /// Load the contact from a config provider.
    ///
    /// Returns `None` when no admin address is configured; the notifier
    /// treats that as "nothing to do".
    pub fn from_provider<P: ConfigProvider>(provider: &P) -> Option<Self> {
        let recipient = provider.get_string("admin_address").ok()?;
        let base_host = provider.get_string_or("base_server_host", "localhost");

        Some(Self {
            recipient,
            base_host,
        })
    }

    /// Sender address derived from the base host.
    pub fn sender(&self) -> String {
        format!("webmaster@{}", self.base_host)
    }

    /// Returns true if the recipient address is well-formed.
    pub fn has_valid_recipient(&self) -> bool {
        is_valid_email(&self.recipient)
    }

    /// Validate this contact.
    ///
    /// The notifier itself never calls this (a bad recipient is a silent
    /// no-op there), but callers that want to surface misconfiguration at
    /// load time can.
    pub fn validate(&self) -> Result<()> {
        if !self.has_valid_recipient() {
            return Err(MailerError::InvalidRecipient(self.recipient.clone()));
        }
        if self.base_host.is_empty() {
            return Err(MailerError::configuration("Base host is required"));
        }
        Ok(())
    }
}
