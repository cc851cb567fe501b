//! C3 — DNS Cache.
//!
//! Grounded on `dns/cache/storage.rs`'s `DnsCache` (a `DashMap`-backed
//! answer cache with a periodic sweep), drastically simplified: no
//! bloom-filter negative cache, no LFU-K/hit-rate/adaptive eviction —
//! just "remove expired, else evict the oldest 10%" per §4.3.

use dashmap::DashMap;
use dnshield_domain::cache_entry::{CacheEntry, CacheKey, CachedRecord};
use std::time::Instant;

pub struct DnsCache {
    entries: DashMap<CacheKey, CacheEntry>,
    max_entries: usize,
}

impl DnsCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries,
        }
    }

    /// Returns a deep copy of the live records, or `None` on miss/expiry
    /// (§4.3: "returns a deep copy of RRs if expires_at > now, else None").
    pub fn get(&self, key: &CacheKey) -> Option<Vec<CachedRecord>> {
        let now = Instant::now();
        let entry = self.entries.get(key)?;
        if entry.is_live(now) {
            Some(entry.records.clone())
        } else {
            drop(entry);
            self.entries.remove(key);
            None
        }
    }

    /// §4.3: "if |entries| >= max, first remove all expired entries; if
    /// still >= max, remove the max/10 entries with smallest expires_at."
    pub fn set(&self, key: CacheKey, records: Vec<CachedRecord>, ttl_secs: u32) {
        if self.entries.len() >= self.max_entries {
            self.evict_expired();
        }
        if self.entries.len() >= self.max_entries {
            self.evict_oldest(self.max_entries / 10);
        }
        self.entries.insert(key, CacheEntry::new(records, ttl_secs));
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Background sweep target, called every 60 s by the cache-sweep job.
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        before - self.entries.len()
    }

    fn evict_oldest(&self, count: usize) {
        if count == 0 {
            return;
        }
        let mut by_expiry: Vec<(CacheKey, Instant)> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().expires_at))
            .collect();
        by_expiry.sort_by_key(|(_, expires_at)| *expires_at);
        for (key, _) in by_expiry.into_iter().take(count) {
            self.entries.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dnshield_domain::cache_entry::QueryType;
    use std::net::{IpAddr, Ipv4Addr};

    fn record() -> CachedRecord {
        CachedRecord { addr: IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34)), ttl: 300 }
    }

    #[test]
    fn test_hit_then_expiry_miss() {
        let cache = DnsCache::new(100);
        let key = CacheKey::new("example.com", QueryType::A);
        cache.set(key.clone(), vec![record()], 0);
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn test_live_entry_hits() {
        let cache = DnsCache::new(100);
        let key = CacheKey::new("example.com", QueryType::A);
        cache.set(key.clone(), vec![record()], 300);
        assert!(cache.get(&key).is_some());
    }

    #[test]
    fn test_eviction_keeps_cache_under_max() {
        let cache = DnsCache::new(10);
        for i in 0..15 {
            let key = CacheKey::new(format!("host{i}.example"), QueryType::A);
            cache.set(key, vec![record()], 300);
        }
        assert!(cache.len() <= 10);
    }

    #[test]
    fn test_clear_empties_cache() {
        let cache = DnsCache::new(100);
        cache.set(CacheKey::new("example.com", QueryType::A), vec![record()], 300);
        cache.clear();
        assert!(cache.is_empty());
    }
}
