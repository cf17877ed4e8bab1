//! Suppression cache
//!
//! A decaying map from notification signature to expiry instant. Every
//! entry consulted for a suppression decision has its expiry strictly in
//! the future: expired entries are purged before lookup. The cache lives
//! only for the duration of one notification attempt: it is loaded from a
//! `ConfigStore`, mutated, and persisted back by the caller.
//!
//! The persisted form is a JSON object mapping hex signatures to RFC 3339
//! expiry timestamps. A corrupt blob decodes to the empty cache: dedup is
//! advisory and must never block a notification.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{ConfigStore, SUPPRESSIONS_KEY};
use crate::error::{MailerError, Result};
use crate::signature::Signature;

/// Length of the suppression window, in hours.
pub const SUPPRESSION_WINDOW_HOURS: i64 = 24;

/// Map from notification signature to suppression expiry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuppressionCache {
    entries: HashMap<Signature, DateTime<Utc>>,
}

impl SuppressionCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, including any not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes exactly the entries whose expiry is at or before `now`.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) {
        self.entries.retain(|_, expiry| *expiry > now);
    }

    /// Returns true if `signature` has an entry.
    ///
    /// Callers purge first, so a present entry implies an unexpired one.
    pub fn contains(&self, signature: &Signature) -> bool {
        self.entries.contains_key(signature)
    }

    /// Expiry instant recorded for `signature`, if any.
    pub fn expiry_of(&self, signature: &Signature) -> Option<DateTime<Utc>> {
        self.entries.get(signature).copied()
    }

    /// Records a delivered notification, suppressing repeats until the
    /// window elapses.
    pub fn record(&mut self, signature: Signature, now: DateTime<Utc>) {
        self.entries
            .insert(signature, now + Duration::hours(SUPPRESSION_WINDOW_HOURS));
    }

    /// Decodes a persisted cache blob, rejecting malformed input.
    pub fn try_decode(blob: &str) -> Result<Self> {
        serde_json::from_str(blob).map_err(|e| MailerError::cache_codec(e.to_string()))
    }

    /// Decodes a persisted cache blob.
    ///
    /// A malformed blob yields the empty cache (fail open) with a warning.
    pub fn decode(blob: &str) -> Self {
        Self::try_decode(blob).unwrap_or_else(|e| {
            warn!(error = %e, "discarding corrupt suppression cache");
            Self::default()
        })
    }

    /// Encodes the cache for persistence.
    pub fn encode(&self) -> String {
        // A string-keyed map of timestamps cannot fail to serialize.
        serde_json::to_string(&self.entries).unwrap_or_else(|e| {
            warn!(error = %e, "failed to encode suppression cache");
            "{}".to_string()
        })
    }

    /// Loads the cache from a config store, treating an absent or corrupt
    /// value as empty.
    pub fn load(store: &dyn ConfigStore) -> Self {
        match store.get(SUPPRESSIONS_KEY) {
            Some(blob) => Self::decode(&blob),
            None => Self::default(),
        }
    }

    /// Persists the cache back to a config store.
    pub fn persist(&self, store: &mut dyn ConfigStore) {
        store.set(SUPPRESSIONS_KEY, self.encode());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfigStore;

    fn sig(n: u8) -> Signature {
        Signature::of(&format!("body {}", n))
    }

    #[test]
    fn test_purge_removes_exactly_expired_entries() {
        let now = Utc::now();
        let mut cache = SuppressionCache::new();
        cache.entries.insert(sig(1), now - Duration::seconds(1));
        cache.entries.insert(sig(2), now);
        cache.entries.insert(sig(3), now + Duration::seconds(1));
        cache.entries.insert(sig(4), now + Duration::hours(12));

        cache.purge_expired(now);

        assert!(!cache.contains(&sig(1)));
        assert!(!cache.contains(&sig(2)), "expiry == now counts as expired");
        assert!(cache.contains(&sig(3)));
        assert!(cache.contains(&sig(4)));
    }

    #[test]
    fn test_record_sets_24h_expiry() {
        let now = Utc::now();
        let mut cache = SuppressionCache::new();
        cache.record(sig(1), now);

        assert_eq!(cache.expiry_of(&sig(1)), Some(now + Duration::hours(24)));
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let now = Utc::now();
        let mut cache = SuppressionCache::new();
        cache.record(sig(1), now);
        cache.record(sig(2), now);

        let decoded = SuppressionCache::decode(&cache.encode());
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded.expiry_of(&sig(1)), cache.expiry_of(&sig(1)));
    }

    #[test]
    fn test_corrupt_blob_decodes_to_empty() {
        assert!(SuppressionCache::decode("not json").is_empty());
        assert!(SuppressionCache::decode(r#"{"zz": 12}"#).is_empty());
        assert!(SuppressionCache::decode("").is_empty());
    }

    #[test]
    fn test_try_decode_rejects_corrupt_blob() {
        assert!(SuppressionCache::try_decode("not json").is_err());
        assert!(SuppressionCache::try_decode("{}").unwrap().is_empty());
    }

    #[test]
    fn test_store_round_trip() {
        let now = Utc::now();
        let mut store = MemoryConfigStore::new();

        // No value stored yet: loads as empty.
        assert!(SuppressionCache::load(&store).is_empty());

        let mut cache = SuppressionCache::new();
        cache.record(sig(7), now);
        cache.persist(&mut store);

        let reloaded = SuppressionCache::load(&store);
        assert_eq!(reloaded, cache);
    }
}
