//! §4.8's leaf-certificate cache sweep: "removes entries where
//! cache_expires_at < now every 30 s". Shaped on `blocklist_sync.rs`'s
//! loop; this one has no on-demand trigger since nothing in the admin
//! surface needs to force an early sweep.

use dnshield_infrastructure::tls::CertGenerator;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

const DEFAULT_INTERVAL_SECS: u64 = 30;

pub struct CertSweepJob {
    generator: Arc<CertGenerator>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl CertSweepJob {
    pub fn new(generator: Arc<CertGenerator>) -> Self {
        Self { generator, interval: Duration::from_secs(DEFAULT_INTERVAL_SECS), shutdown: CancellationToken::new() }
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
        info!(interval_secs = self.interval.as_secs(), "starting certificate cache sweep job");

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("CertSweepJob: shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        let removed = self.generator.sweep_expired();
                        if removed > 0 {
                            info!(removed, "swept expired leaf certificates");
                        }
                    }
                }
            }
        });
    }
}
