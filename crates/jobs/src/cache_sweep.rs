//! DNS answer-cache eviction (§4.3: "expired entries are evicted lazily
//! on lookup and by a periodic sweep"). Same loop shape as `cert_sweep.rs`.

use dnshield_infrastructure::dns::DnsCache;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

const DEFAULT_INTERVAL_SECS: u64 = 60;

pub struct CacheSweepJob {
    cache: Arc<DnsCache>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl CacheSweepJob {
    pub fn new(cache: Arc<DnsCache>) -> Self {
        Self { cache, interval: Duration::from_secs(DEFAULT_INTERVAL_SECS), shutdown: CancellationToken::new() }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(interval_secs = self.interval.as_secs(), "starting DNS cache sweep job");

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("CacheSweepJob: shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        let removed = self.cache.evict_expired();
                        if removed > 0 {
                            info!(removed, "evicted expired DNS cache entries");
                        }
                    }
                }
            }
        });
    }
}
