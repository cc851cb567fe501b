//! In-memory counters and recent-blocked ring buffer backing `/api/statistics`
//! and `/api/recent-blocked`.
//!
//! The reference implementation persists query events to its SQL-backed
//! `QueryLogRepository` via a batching background logger
//! (`dns/query_logger.rs`); this system has no database, so C4 and the
//! HTTPS block server update these counters directly and the admin API
//! reads them through [`StatsPort`] — same read/write split, no queue.

use chrono::Utc;
use dnshield_application::ports::{BlockedEvent, Statistics, StatsPort};
use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

const RECENT_BLOCKED_CAPACITY: usize = 200;

pub struct StatsCollector {
    queries_total: AtomicU64,
    blocked_total: AtomicU64,
    cache_hits_total: AtomicU64,
    cache_misses_total: AtomicU64,
    upstream_errors_total: AtomicU64,
    tls_blocks_total: AtomicU64,
    recent_blocked: Mutex<VecDeque<BlockedEvent>>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self {
            queries_total: AtomicU64::new(0),
            blocked_total: AtomicU64::new(0),
            cache_hits_total: AtomicU64::new(0),
            cache_misses_total: AtomicU64::new(0),
            upstream_errors_total: AtomicU64::new(0),
            tls_blocks_total: AtomicU64::new(0),
            recent_blocked: Mutex::new(VecDeque::with_capacity(RECENT_BLOCKED_CAPACITY)),
        }
    }

    pub fn record_query(&self) {
        self.queries_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_upstream_error(&self) {
        self.upstream_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Recorded by C4 for a blocked DNS query and by C9 for a blocked
    /// TLS connection (`tls` distinguishes the two in `rule`).
    pub fn record_blocked(&self, domain: &str, client_ip: IpAddr) {
        self.blocked_total.fetch_add(1, Ordering::Relaxed);
        self.push_recent(BlockedEvent {
            domain: domain.to_string(),
            rule: "dns".to_string(),
            client_ip: client_ip.to_string(),
            user: None,
            group: None,
            at: Utc::now(),
        });
    }

    pub fn record_tls_blocked(&self, domain: &str, client_ip: IpAddr) {
        self.blocked_total.fetch_add(1, Ordering::Relaxed);
        self.tls_blocks_total.fetch_add(1, Ordering::Relaxed);
        self.push_recent(BlockedEvent {
            domain: domain.to_string(),
            rule: "tls".to_string(),
            client_ip: client_ip.to_string(),
            user: None,
            group: None,
            at: Utc::now(),
        });
    }

    fn push_recent(&self, event: BlockedEvent) {
        let mut recent = self.recent_blocked.lock().unwrap_or_else(|e| e.into_inner());
        if recent.len() == RECENT_BLOCKED_CAPACITY {
            recent.pop_back();
        }
        recent.push_front(event);
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsPort for StatsCollector {
    fn snapshot(&self) -> Statistics {
        Statistics {
            queries_total: self.queries_total.load(Ordering::Relaxed),
            blocked_total: self.blocked_total.load(Ordering::Relaxed),
            cache_hits_total: self.cache_hits_total.load(Ordering::Relaxed),
            cache_misses_total: self.cache_misses_total.load(Ordering::Relaxed),
            upstream_errors_total: self.upstream_errors_total.load(Ordering::Relaxed),
            tls_blocks_total: self.tls_blocks_total.load(Ordering::Relaxed),
        }
    }

    fn recent_blocked(&self, limit: usize) -> Vec<BlockedEvent> {
        let recent = self.recent_blocked.lock().unwrap_or_else(|e| e.into_inner());
        recent.iter().take(limit).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn ip() -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5))
    }

    #[test]
    fn test_counters_accumulate() {
        let stats = StatsCollector::new();
        stats.record_query();
        stats.record_query();
        stats.record_cache_hit();
        stats.record_blocked("ads.example", ip());
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.queries_total, 2);
        assert_eq!(snapshot.cache_hits_total, 1);
        assert_eq!(snapshot.blocked_total, 1);
    }

    #[test]
    fn test_recent_blocked_most_recent_first_and_capped() {
        let stats = StatsCollector::new();
        for i in 0..5 {
            stats.record_blocked(&format!("host{i}.example"), ip());
        }
        let recent = stats.recent_blocked(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].domain, "host4.example");
        assert_eq!(recent[1].domain, "host3.example");
    }

    #[test]
    fn test_ring_buffer_evicts_oldest_past_capacity() {
        let stats = StatsCollector::new();
        for i in 0..(RECENT_BLOCKED_CAPACITY + 10) {
            stats.record_blocked(&format!("host{i}.example"), ip());
        }
        let recent = stats.recent_blocked(RECENT_BLOCKED_CAPACITY + 10);
        assert_eq!(recent.len(), RECENT_BLOCKED_CAPACITY);
        assert_eq!(recent[0].domain, format!("host{}.example", RECENT_BLOCKED_CAPACITY + 9));
    }
}
