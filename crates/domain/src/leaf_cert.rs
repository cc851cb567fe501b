//! `LeafCertEntry` (§3, §4.8).

use chrono::{DateTime, Utc};
use std::time::Instant;

/// A minted per-SNI leaf certificate, cached until [`LeafCertEntry::cache_expires_at`]
/// or its hard `not_after`, whichever is sooner (Invariant 3, "MUST NOT
/// outlive its NotAfter").
pub struct LeafCertEntry {
    pub cert_chain_der: Vec<Vec<u8>>,
    pub key_der: Vec<u8>,
    pub not_after: DateTime<Utc>,
    pub cache_expires_at: Instant,
}

impl LeafCertEntry {
    pub fn is_fresh(&self, now: Instant) -> bool {
        self.cache_expires_at > now
    }
}

impl std::fmt::Debug for LeafCertEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeafCertEntry")
            .field("not_after", &self.not_after)
            .field("key_der", &"<redacted>")
            .finish()
    }
}
