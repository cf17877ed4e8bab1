//! The notification deduplicator
//!
//! `ExceptionNotifier` decides, for a given failure report, whether to emit
//! an admin notification, and prevents re-emission of the same failure
//! within the 24-hour suppression window.
//!
//! Propagation policy: this component serves the panel's error-handling
//! path, so none of its own failures may escalate. Every internal failure
//! degrades to a `NotifyOutcome`: delivery errors are logged and
//! swallowed, configuration gaps are a silent no-op.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::body::{append_footer, append_request_context, render_static_body, word_wrap, WRAP_COLUMNS};
use crate::cache::SuppressionCache;
use crate::config::{AdminContact, ConfigStore};
use crate::report::{FailureReport, RequestContext};
use crate::signature::Signature;
use crate::transport::{MailMessage, MailTransport};
use crate::MAILER_NAME;

/// Why a notification attempt did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No admin contact is configured
    NoRecipient,
    /// The configured recipient address is malformed
    InvalidRecipient,
}

/// Result of one notification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// The notification was delivered and recorded in the cache
    Sent,
    /// An identical failure was already notified within the window
    Suppressed,
    /// Nothing to do (configuration missing or invalid)
    Skipped(SkipReason),
    /// The transport refused the message; the cache is unchanged so the
    /// next identical failure retries delivery
    DeliveryFailed,
}

impl NotifyOutcome {
    /// Returns true if a message was delivered.
    pub fn sent(&self) -> bool {
        matches!(self, NotifyOutcome::Sent)
    }
}

/// Formats, deduplicates, and delivers exception notifications.
pub struct ExceptionNotifier<T: MailTransport> {
    transport: T,
    contact: Option<AdminContact>,
}

impl<T: MailTransport> ExceptionNotifier<T> {
    /// Create a notifier for the given transport and contact.
    ///
    /// `contact` may be `None` when the panel has no admin address
    /// configured; every notification attempt is then a no-op.
    pub fn new(transport: T, contact: Option<AdminContact>) -> Self {
        Self { transport, contact }
    }

    /// Attempt a notification for `report`, deduplicating against `cache`.
    ///
    /// Returns the outcome together with the updated cache; the caller is
    /// responsible for persisting the cache if a durable store exists.
    pub async fn notify(
        &self,
        report: &FailureReport,
        ctx: &RequestContext,
        cache: SuppressionCache,
    ) -> (NotifyOutcome, SuppressionCache) {
        self.notify_at(report, ctx, cache, Utc::now()).await
    }

    /// `notify` with an explicit clock, for deterministic window tests.
    pub async fn notify_at(
        &self,
        report: &FailureReport,
        ctx: &RequestContext,
        mut cache: SuppressionCache,
        now: DateTime<Utc>,
    ) -> (NotifyOutcome, SuppressionCache) {
        let contact = match &self.contact {
            Some(contact) => contact,
            None => {
                debug!("no admin contact configured, skipping notification");
                return (NotifyOutcome::Skipped(SkipReason::NoRecipient), cache);
            }
        };

        if !contact.has_valid_recipient() {
            warn!(recipient = %contact.recipient, "malformed admin address, skipping notification");
            return (NotifyOutcome::Skipped(SkipReason::InvalidRecipient), cache);
        }

        // The signature covers only the static body; request context and
        // wrapping are applied afterwards.
        let static_body = render_static_body(report);
        let signature = Signature::of(&static_body);

        cache.purge_expired(now);
        if cache.contains(&signature) {
            debug!(%signature, "identical failure already notified within the window");
            return (NotifyOutcome::Suppressed, cache);
        }

        let mut body = static_body;
        append_request_context(&mut body, ctx);
        append_footer(&mut body);
        let body = word_wrap(&body, WRAP_COLUMNS);

        let message = MailMessage {
            to: contact.recipient.clone(),
            from: format!("\"{}\" <{}>", MAILER_NAME, contact.sender()),
            subject: format!("{} - An exception has been thrown", MAILER_NAME),
            body,
            headers: standard_headers(),
        };

        match self.transport.send(&message).await {
            Ok(()) => {
                cache.record(signature, now);
                (NotifyOutcome::Sent, cache)
            }
            Err(e) => {
                warn!(transport = self.transport.name(), error = %e, "notification delivery failed");
                (NotifyOutcome::DeliveryFailed, cache)
            }
        }
    }

    /// Attempt a notification, loading and persisting the suppression cache
    /// through `store`.
    pub async fn notify_with_store(
        &self,
        report: &FailureReport,
        ctx: &RequestContext,
        store: &mut dyn ConfigStore,
    ) -> NotifyOutcome {
        let cache = SuppressionCache::load(store);
        let (outcome, cache) = self.notify(report, ctx, cache).await;
        cache.persist(store);
        outcome
    }
}

/// Fixed headers attached to every notification.
fn standard_headers() -> Vec<(String, String)> {
    vec![
        ("MIME-Version".to_string(), "1.0".to_string()),
        (
            "Content-Type".to_string(),
            "text/plain; charset=utf-8".to_string(),
        ),
        ("Content-Transfer-Encoding".to_string(), "8bit".to_string()),
        ("X-Mailer".to_string(), MAILER_NAME.to_string()),
    ]
}
