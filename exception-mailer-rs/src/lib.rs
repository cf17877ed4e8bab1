//! # Exception Mailer
//!
//! Deduplicated exception-notification mail delivery for the HostPanel admin.
//!
//! When an uncaught failure reaches the panel's error-handling path, this
//! crate formats a human-readable report, computes a stable signature over
//! its static portion, and delivers it to the administrator, at most once
//! per distinct failure within a rolling 24-hour window.
//!
//! This crate provides:
//!
//! - `FailureReport` / `RequestContext`: the failure description and the
//!   per-request fields appended to it
//! - `Signature` / `SuppressionCache`: the dedup key and the decaying cache
//!   of recently notified failures
//! - `MailTransport`: the delivery seam, with an HTTP relay implementation
//! - `ExceptionNotifier`: the operation tying it all together
//!
//! ## Architecture
//!
//! The notifier is fully dependency-injected: configuration, contact info,
//! and cache state are explicit parameters and return values. It never
//! raises; every internal failure degrades to a typed `NotifyOutcome`
//! so the error path it serves cannot be crashed by its own reporter.

pub mod body;
pub mod cache;
pub mod config;
pub mod error;
pub mod notifier;
pub mod report;
pub mod signature;
pub mod transport;

pub use cache::{SuppressionCache, SUPPRESSION_WINDOW_HOURS};
pub use config::{
    AdminContact, ConfigProvider, ConfigStore, EnvConfigProvider, MemoryConfigProvider,
    MemoryConfigStore, SUPPRESSIONS_KEY,
};
pub use error::{MailerError, Result};
pub use notifier::{ExceptionNotifier, NotifyOutcome, SkipReason};
pub use report::{FailureReport, RequestContext, StackFrame};
pub use signature::Signature;
pub use transport::{HttpRelayTransport, MailMessage, MailTransport, RelayConfig};

#[cfg(test)]
mod tests;

/// Fixed mailer identity, used as the sender display name, the `X-Mailer`
/// header, and the body footer.
pub const MAILER_NAME: &str = "HostPanel Exception Mailer";
