use dnshield_application::ports::ApiKeyStorePort;
use dnshield_application::use_cases::{
    ClearCacheUseCase, GetConfigUseCase, GetRecentBlockedUseCase, GetStatisticsUseCase, GetStatusUseCase, PauseUseCase, RefreshRulesUseCase,
    ResumeUseCase, UpdateConfigUseCase,
};
use dnshield_infrastructure::dns::RateLimiter;
use std::sync::Arc;

/// Handlers call through the application-layer use cases rather than
/// the ports directly, the way the reference implementation's API layer
/// is a thin adapter in front of its own orchestration layer. Only
/// `api_keys` (consulted by the auth middleware, not by a handler) and
/// `rate_limiter` are held as raw dependencies — neither has a use case
/// of its own.
#[derive(Clone)]
pub struct AppState {
    pub get_status: Arc<GetStatusUseCase>,
    pub get_statistics: Arc<GetStatisticsUseCase>,
    pub get_recent_blocked: Arc<GetRecentBlockedUseCase>,
    pub get_config: Arc<GetConfigUseCase>,
    pub update_config: Arc<UpdateConfigUseCase>,
    pub pause: Arc<PauseUseCase>,
    pub resume: Arc<ResumeUseCase>,
    pub refresh_rules: Arc<RefreshRulesUseCase>,
    pub clear_cache: Arc<ClearCacheUseCase>,
    pub api_keys: Arc<dyn ApiKeyStorePort>,
    pub rate_limiter: Arc<RateLimiter>,
}
