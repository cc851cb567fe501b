//! Dependency wiring for `run`, grouped the way the reference
//! implementation's `di::{DnsServices, Repositories, UseCases}` groups its
//! own constructors, adapted to this system's component set.

use dnshield_application::ports::PolicyRefreshPort;
use dnshield_application::use_cases::{
    ClearCacheUseCase, GetConfigUseCase, GetRecentBlockedUseCase, GetStatisticsUseCase, GetStatusUseCase, PauseUseCase, RefreshRulesUseCase,
    ResumeUseCase, UpdateConfigUseCase,
};
use dnshield_api::AppState;
use dnshield_domain::{AppConfig, DnshieldError};
use dnshield_infrastructure::api_keys::FileApiKeyStore;
use dnshield_infrastructure::cache_control::CacheControl;
use dnshield_infrastructure::config_store::FileConfigStore;
use dnshield_infrastructure::dns::{BlockEngine, CaptivePortalDetector, DnsCache, HandlerConfig, RateLimiter, UpstreamPool};
use dnshield_infrastructure::network::{LinuxNetworkDetector, LinuxPlatformGlue, NetworkDnsManager};
use dnshield_infrastructure::policy::{BlocklistParser, PolicyFetcher};
use dnshield_infrastructure::stats::StatsCollector;
use dnshield_infrastructure::tls::{CaManager, CertGenerator, SniCertResolver};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Everything the DNS/TLS listeners, admin API, and background jobs are
/// built from. One instance per `run` invocation.
pub struct CoreServices {
    pub block_engine: Arc<BlockEngine>,
    pub dns_cache: Arc<DnsCache>,
    pub captive_portal: Arc<CaptivePortalDetector>,
    pub upstream: Arc<UpstreamPool>,
    pub rate_limiter: Arc<RateLimiter>,
    pub stats: Arc<StatsCollector>,
    pub ca_manager: Arc<CaManager>,
    pub cert_generator: Arc<CertGenerator>,
    pub cert_resolver: Arc<SniCertResolver>,
    pub cache_control: Arc<CacheControl>,
    pub config_store: Arc<FileConfigStore>,
    pub api_keys: Arc<FileApiKeyStore>,
    pub network_manager: NetworkDnsManager,
    pub platform_glue: Arc<LinuxPlatformGlue>,
}

pub fn build_core(config: &AppConfig, config_path: &std::path::Path) -> Result<CoreServices, DnshieldError> {
    let block_engine = Arc::new(BlockEngine::new());
    let dns_cache = Arc::new(DnsCache::new(config.cache.max_entries));
    let captive_portal = Arc::new(CaptivePortalDetector::new(config.captive_portal.clone()));

    let upstream_servers = parse_upstream_servers(&config.dns.upstream_servers)?;
    let upstream = Arc::new(UpstreamPool::new(upstream_servers, Duration::from_millis(config.dns.upstream_timeout_ms)));
    let rate_limiter = Arc::new(RateLimiter::new(config.admin.rate_limit_per_minute, Duration::from_secs(60)));
    let stats = Arc::new(StatsCollector::new());

    let ca_manager = Arc::new(CaManager::load_or_generate(&config.tls.ca_dir)?);
    let cert_generator = Arc::new(CertGenerator::new(ca_manager.clone(), Duration::from_secs(config.tls.leaf_validity_secs as u64), config.tls.wildcard_san));
    let cert_resolver = Arc::new(SniCertResolver::new(cert_generator.clone()));
    let cache_control = Arc::new(CacheControl::new(dns_cache.clone(), cert_generator.clone()));

    let config_store = Arc::new(FileConfigStore::new(config_path.to_path_buf(), config.clone()));
    let api_keys = Arc::new(FileApiKeyStore::load_or_create(config.admin.api_keys_path.clone())?);

    let platform_glue = Arc::new(LinuxPlatformGlue::new());
    let detector = Arc::new(LinuxNetworkDetector::new());
    let network_manager = NetworkDnsManager::new(platform_glue.clone(), detector);

    Ok(CoreServices {
        block_engine,
        dns_cache,
        captive_portal,
        upstream,
        rate_limiter,
        stats,
        ca_manager,
        cert_generator,
        cert_resolver,
        cache_control,
        config_store,
        api_keys,
        network_manager,
        platform_glue,
    })
}

fn parse_upstream_servers(servers: &[String]) -> Result<Vec<SocketAddr>, DnshieldError> {
    servers.iter().map(|s| s.parse().map_err(|e| DnshieldError::config(format!("dns.upstream_servers entry {s:?}: {e}")))).collect()
}

pub fn handler_config(config: &AppConfig) -> Result<HandlerConfig, DnshieldError> {
    Ok(HandlerConfig {
        sinkhole_ipv4: config.dns.sinkhole_ipv4.parse().map_err(|e| DnshieldError::config(format!("dns.sinkhole_ipv4: {e}")))?,
        block_ttl: config.dns.block_ttl,
        upstream_timeout: Duration::from_millis(config.dns.upstream_timeout_ms),
        cache_max_ttl: config.cache.max_ttl_secs,
    })
}

/// Only built when `policy.bucket_url` is configured (§4.10: "enabled
/// only when a bucket is configured; otherwise C11 stays idle").
pub fn build_policy_fetcher(config: &AppConfig, device_name: &str) -> Result<Option<Arc<PolicyFetcher>>, DnshieldError> {
    match &config.policy.bucket_url {
        Some(bucket_url) => {
            let fetcher = PolicyFetcher::new(bucket_url, config.policy.clone(), device_name.to_string())?;
            Ok(Some(Arc::new(fetcher)))
        }
        None => Ok(None),
    }
}

pub fn build_blocklist_parser(config: &AppConfig) -> Arc<BlocklistParser> {
    Arc::new(BlocklistParser::new(config.blocklist.clone()))
}

pub fn device_name() -> String {
    hostname::get().ok().and_then(|h| h.into_string().ok()).unwrap_or_else(|| "unknown-device".to_string())
}

/// Stands in for the Rule Updater Job's `PolicyRefreshPort` when no
/// policy bucket is configured, so `/api/refresh-rules` always has
/// something to call rather than needing an `Option` threaded through
/// `AppState`.
pub struct NoopPolicyRefresh;

#[async_trait::async_trait]
impl PolicyRefreshPort for NoopPolicyRefresh {
    async fn trigger_refresh(&self) -> Result<(), DnshieldError> {
        warn!("refresh-rules requested but no policy bucket is configured; nothing to refresh");
        Ok(())
    }
}

/// Composes the admin API's `AppState` out of `CoreServices`, wiring each
/// `application::use_cases` orchestrator to its concrete adapter. One
/// `Arc<dyn Port>` per use case, matching how `crates/api/tests/routes_test.rs`
/// builds the same shape out of stubs.
///
/// `policy_refresh` is the live `RuleUpdaterJob` handle when one is
/// running, or [`NoopPolicyRefresh`] when no policy bucket is configured.
pub fn build_app_state(core: &CoreServices, policy_refresh: Arc<dyn PolicyRefreshPort>) -> AppState {
    let network_control = Arc::new(core.network_manager.clone());

    AppState {
        get_status: Arc::new(GetStatusUseCase::new(network_control.clone(), core.block_engine.clone())),
        get_statistics: Arc::new(GetStatisticsUseCase::new(core.stats.clone())),
        get_recent_blocked: Arc::new(GetRecentBlockedUseCase::new(core.stats.clone())),
        get_config: Arc::new(GetConfigUseCase::new(core.config_store.clone())),
        update_config: Arc::new(UpdateConfigUseCase::new(core.config_store.clone())),
        pause: Arc::new(PauseUseCase::new(network_control.clone())),
        resume: Arc::new(ResumeUseCase::new(network_control)),
        refresh_rules: Arc::new(RefreshRulesUseCase::new(policy_refresh)),
        clear_cache: Arc::new(ClearCacheUseCase::new(core.cache_control.clone())),
        api_keys: core.api_keys.clone(),
        rate_limiter: core.rate_limiter.clone(),
    }
}
