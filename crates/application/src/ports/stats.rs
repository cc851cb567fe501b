use chrono::{DateTime, Utc};

/// One blocked-query record, appended by C4/C8 and surfaced by
/// `/api/recent-blocked` (§4.13's "last ≤20 blocked events").
#[derive(Debug, Clone)]
pub struct BlockedEvent {
    pub domain: String,
    pub rule: String,
    pub client_ip: String,
    pub user: Option<String>,
    pub group: Option<String>,
    pub at: DateTime<Utc>,
}

/// Counters snapshot for `/api/statistics`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Statistics {
    pub queries_total: u64,
    pub blocked_total: u64,
    pub cache_hits_total: u64,
    pub cache_misses_total: u64,
    pub upstream_errors_total: u64,
    pub tls_blocks_total: u64,
}

/// Read side of the counters/recent-events state C4 and C8 write to.
/// Kept as a trait so the admin API's use cases don't depend on the
/// concrete DashMap/ring-buffer storage in the infrastructure crate.
pub trait StatsPort: Send + Sync {
    fn snapshot(&self) -> Statistics;

    /// Most recent blocked events, most recent first, capped to `limit`.
    fn recent_blocked(&self, limit: usize) -> Vec<BlockedEvent>;
}
