//! The per-object metadata record: class, checksum, timestamps, TTL, relations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Sibling record written next to every object file.
///
/// `ttl` is `None` for "never expires", `Some(0)` for "already
/// expired the instant it was written", and `Some(n)` for "expires
/// `n` seconds after `updated_at`".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub uuid: Uuid,
    pub class: String,
    pub checksum: String,
    pub created_at: f64,
    pub updated_at: f64,
    pub ttl: Option<u64>,
    pub children: BTreeSet<Uuid>,
    pub parents: BTreeSet<Uuid>,
}

impl MetadataRecord {
    pub fn new(uuid: Uuid, class: impl Into<String>, checksum: impl Into<String>, now: f64) -> Self {
        Self {
            uuid,
            class: class.into(),
            checksum: checksum.into(),
            created_at: now,
            updated_at: now,
            ttl: None,
            children: BTreeSet::new(),
            parents: BTreeSet::new(),
        }
    }

    /// Whether this record has elapsed its TTL as of `now` (epoch seconds).
    ///
    /// A record with `ttl = None` never expires. `ttl = Some(0)` is
    /// expired as of `updated_at` itself.
    pub fn is_expired_at(&self, now: f64) -> bool {
        match self.ttl {
            None => false,
            Some(ttl) => now > self.updated_at + ttl as f64,
        }
    }

    /// Remaining seconds until expiry, or `None` if the record has no TTL.
    /// Returns `Some(0)` (never negative) once expired.
    pub fn remaining_seconds(&self, now: f64) -> Option<f64> {
        self.ttl.map(|ttl| {
            let remaining = (self.updated_at + ttl as f64) - now;
            remaining.max(0.0)
        })
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_ttl(ttl: Option<u64>) -> MetadataRecord {
        let mut record = MetadataRecord::new(Uuid::nil(), "User", "sha256:abc", 1_000.0);
        record.ttl = ttl;
        record
    }

    #[test]
    fn no_ttl_never_expires() {
        let record = record_with_ttl(None);
        assert!(!record.is_expired_at(1_000_000.0));
        assert_eq!(record.remaining_seconds(1_000_000.0), None);
    }

    #[test]
    fn zero_ttl_is_immediately_expired() {
        let record = record_with_ttl(Some(0));
        assert!(record.is_expired_at(1_000.0001));
        assert_eq!(record.remaining_seconds(1_000.0), Some(0.0));
    }

    #[test]
    fn positive_ttl_expires_after_window() {
        let record = record_with_ttl(Some(60));
        assert!(!record.is_expired_at(1_050.0));
        assert!(record.is_expired_at(1_061.0));
        assert_eq!(record.remaining_seconds(1_030.0), Some(30.0));
    }

    #[test]
    fn round_trips_through_json() {
        let mut record = record_with_ttl(Some(60));
        record.children.insert(Uuid::nil());
        let bytes = record.to_bytes().unwrap();
        let decoded = MetadataRecord::from_bytes(&bytes).unwrap();
        assert_eq!(record, decoded);
    }
}
