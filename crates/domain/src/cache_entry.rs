//! `CacheEntry` (§3, §4.3).
//!
//! Grounded on the reference implementation's `dns/cache/{key.rs,data.rs}`,
//! trimmed to the fields this spec's simpler eviction policy actually needs
//! (no hit-rate/LFU-K bookkeeping).

use std::net::IpAddr;
use std::time::Instant;

/// DNS record types relevant to the sinkhole/forward decision (§4.4).
/// Anything else is forwarded untouched ("unknown qtypes are forwarded
/// untouched"), so this is intentionally not exhaustive of RFC 1035.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    A,
    Aaaa,
    Other(u16),
}

/// Cache key: lowercased domain + query type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub domain: String,
    pub qtype: QueryType,
}

impl CacheKey {
    pub fn new(domain: impl Into<String>, qtype: QueryType) -> Self {
        Self { domain: domain.into(), qtype }
    }
}

/// One resource record as cached — protocol-agnostic (the wire record type
/// is reconstructed by the DNS listener from `addr`/`ttl` at answer time).
#[derive(Debug, Clone)]
pub struct CachedRecord {
    pub addr: IpAddr,
    pub ttl: u32,
}

/// A cached answer set with its absolute expiry, keyed by [`CacheKey`].
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub records: Vec<CachedRecord>,
    pub expires_at: Instant,
}

impl CacheEntry {
    pub fn new(records: Vec<CachedRecord>, ttl_secs: u32) -> Self {
        Self {
            records,
            expires_at: Instant::now() + std::time::Duration::from_secs(ttl_secs as u64),
        }
    }

    /// Invariant 2: a hit is only valid while `expires_at > now`.
    pub fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}
