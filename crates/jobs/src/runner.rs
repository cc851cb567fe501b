use crate::{CacheSweepJob, CertSweepJob, NetworkWatcherJob, RuleUpdaterJob};
use std::sync::Arc;
use tracing::info;

/// Central orchestrator for all background jobs.
///
/// Use the builder pattern to register jobs, then call `.start()` once.
///
/// # Example
///
/// ```rust,ignore
/// JobRunner::new()
///     .with_rule_updater(RuleUpdaterJob::new(fetcher, parser, engine))
///     .with_cert_sweep(CertSweepJob::new(cert_generator))
///     .with_cache_sweep(CacheSweepJob::new(dns_cache))
///     .with_network_watcher(NetworkWatcherJob::new(network_manager))
///     .start()
///     .await;
/// ```
pub struct JobRunner {
    rule_updater: Option<RuleUpdaterJob>,
    cert_sweep: Option<CertSweepJob>,
    cache_sweep: Option<CacheSweepJob>,
    network_watcher: Option<NetworkWatcherJob>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self { rule_updater: None, cert_sweep: None, cache_sweep: None, network_watcher: None }
    }

    pub fn with_rule_updater(mut self, job: RuleUpdaterJob) -> Self {
        self.rule_updater = Some(job);
        self
    }

    pub fn with_cert_sweep(mut self, job: CertSweepJob) -> Self {
        self.cert_sweep = Some(job);
        self
    }

    pub fn with_cache_sweep(mut self, job: CacheSweepJob) -> Self {
        self.cache_sweep = Some(job);
        self
    }

    pub fn with_network_watcher(mut self, job: NetworkWatcherJob) -> Self {
        self.network_watcher = Some(job);
        self
    }

    /// Start all registered background jobs. Returns the rule updater
    /// (if registered) so bootstrap code can hand it to the admin API as
    /// the `PolicyRefreshPort` implementation.
    pub async fn start(self) -> Option<Arc<RuleUpdaterJob>> {
        info!("starting background job runner");

        let rule_updater = self.rule_updater.map(Arc::new);
        if let Some(job) = rule_updater.clone() {
            job.start().await;
        }

        if let Some(job) = self.cert_sweep {
            Arc::new(job).start().await;
        }

        if let Some(job) = self.cache_sweep {
            Arc::new(job).start().await;
        }

        if let Some(job) = self.network_watcher {
            job.start().await;
        }

        info!("all background jobs started");
        rule_updater
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}
