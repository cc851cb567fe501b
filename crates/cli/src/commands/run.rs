//! `dnshield run`: the foreground supervisor that wires every component
//! built by [`crate::di`] and races the DNS/TLS/admin listeners and the
//! background job runner against a shutdown signal.

use crate::di;
use dnshield_application::ports::PolicyRefreshPort;
use dnshield_domain::AppConfig;
use dnshield_jobs::{CacheSweepJob, CertSweepJob, JobRunner, NetworkWatcherJob, RuleUpdaterJob};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

pub struct RunArgs {
    pub auto_configure_dns: bool,
}

pub async fn execute(config: AppConfig, config_path: &Path, args: RunArgs) -> anyhow::Result<()> {
    let core = di::build_core(&config, config_path)?;

    crate::network_state::load_all(&crate::paths::network_dns_dir(), &core.network_manager).await;

    if args.auto_configure_dns {
        core.network_manager.enable_filtering().await?;
    }

    let device = di::device_name();
    let fetcher = di::build_policy_fetcher(&config, &device)?;

    let mut runner = JobRunner::new()
        .with_cert_sweep(CertSweepJob::new(core.cert_generator.clone()))
        .with_cache_sweep(CacheSweepJob::new(core.dns_cache.clone()))
        .with_network_watcher(NetworkWatcherJob::new(core.network_manager.clone()));
    if let Some(fetcher) = fetcher {
        let parser = di::build_blocklist_parser(&config);
        let job = RuleUpdaterJob::new(fetcher, parser, core.block_engine.clone())
            .with_interval(Duration::from_secs(config.policy.refresh_interval_secs))
            .with_jitter(Duration::from_secs(config.policy.refresh_jitter_secs));
        runner = runner.with_rule_updater(job);
    }

    let rule_updater = runner.start().await;
    let policy_refresh: Arc<dyn PolicyRefreshPort> = match rule_updater {
        Some(job) => job,
        None => Arc::new(di::NoopPolicyRefresh),
    };

    let state = di::build_app_state(&core, policy_refresh);

    info!("all listeners starting");
    let result = tokio::select! {
        res = crate::server::dns::run(&config, &core) => res.map_err(anyhow::Error::from),
        res = crate::server::https::run(&config, &core) => res.map_err(anyhow::Error::from),
        res = crate::server::http::run(&config) => res.map_err(anyhow::Error::from),
        res = crate::server::admin::run(&config, state) => res.map_err(anyhow::Error::from),
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            Ok(())
        }
    };

    if let Err(e) = &result {
        error!(error = %e, "a listener exited with an error");
    }

    core.network_manager.shutdown_token().cancel();
    crate::network_state::save_all(&crate::paths::network_dns_dir(), &core.network_manager).await;

    result
}
