//! End-to-end router tests: auth/role enforcement and the public health
//! endpoint, exercised through `tower::ServiceExt::oneshot` rather than a
//! bound socket.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use dnshield_api::state::AppState;
use dnshield_application::ports::*;
use dnshield_application::use_cases::{
    ClearCacheUseCase, GetConfigUseCase, GetRecentBlockedUseCase, GetStatisticsUseCase, GetStatusUseCase, PauseUseCase, RefreshRulesUseCase,
    ResumeUseCase, UpdateConfigUseCase,
};
use dnshield_domain::{AppConfig, ApiKeyRecord, DnshieldError, Role};
use dnshield_infrastructure::dns::RateLimiter;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

struct StubEngine;
#[async_trait]
impl BlockEnginePort for StubEngine {
    fn check(&self, _domain: &str) -> FilterDecision {
        FilterDecision::Allow
    }
    async fn replace_blocklist(&self, domains: Vec<String>) -> Result<usize, DnshieldError> {
        Ok(domains.len())
    }
    async fn replace_allowlist(&self, domains: Vec<String>) -> Result<usize, DnshieldError> {
        Ok(domains.len())
    }
    async fn set_allow_only_mode(&self, _enabled: bool) {}
    async fn update_metadata(&self, _user: Option<String>, _group: Option<String>) {}
    fn stats(&self) -> BlockEngineStats {
        BlockEngineStats { block_domain_count: 0, allow_domain_count: 0, allow_only_mode: false }
    }
}

struct StubStats;
impl StatsPort for StubStats {
    fn snapshot(&self) -> Statistics {
        Statistics::default()
    }
    fn recent_blocked(&self, _limit: usize) -> Vec<BlockedEvent> {
        Vec::new()
    }
}

struct StubConfig;
#[async_trait]
impl ConfigStorePort for StubConfig {
    fn get(&self) -> AppConfig {
        AppConfig::default()
    }
    async fn update(&self, _patch: ConfigUpdate) -> Result<AppConfig, DnshieldError> {
        Ok(AppConfig::default())
    }
}

struct StubNetwork;
#[async_trait]
impl NetworkControlPort for StubNetwork {
    fn status(&self) -> NetworkStatus {
        NetworkStatus { network_id: "default".to_string(), filtering_active: true, paused: false, paused_until: None }
    }
    async fn pause(&self, _duration: Duration) -> Result<(), DnshieldError> {
        Ok(())
    }
    async fn resume(&self) -> Result<(), DnshieldError> {
        Ok(())
    }
}

struct StubRefresh;
#[async_trait]
impl PolicyRefreshPort for StubRefresh {
    async fn trigger_refresh(&self) -> Result<(), DnshieldError> {
        Ok(())
    }
}

struct StubCache;
#[async_trait]
impl CacheControlPort for StubCache {
    async fn clear_dns_cache(&self) -> Result<usize, DnshieldError> {
        Ok(0)
    }
    async fn clear_cert_cache(&self) -> Result<usize, DnshieldError> {
        Ok(0)
    }
}

struct StubKeyStore {
    viewer_token: &'static str,
    admin_token: &'static str,
}
#[async_trait]
impl ApiKeyStorePort for StubKeyStore {
    fn validate(&self, token: &str) -> Option<ApiKeyRecord> {
        if token == self.viewer_token {
            Some(ApiKeyRecord::new("viewer".into(), "viewer key".into(), "h".into(), Role::Viewer, chrono::Utc::now()))
        } else if token == self.admin_token {
            Some(ApiKeyRecord::new("admin".into(), "admin key".into(), "h".into(), Role::Admin, chrono::Utc::now()))
        } else {
            None
        }
    }
    async fn create(&self, _label: String, _role: Role) -> Result<(ApiKeyRecord, String), DnshieldError> {
        unreachable!()
    }
    async fn revoke(&self, _id: &str) -> Result<(), DnshieldError> {
        unreachable!()
    }
    fn list(&self) -> Vec<ApiKeyRecord> {
        Vec::new()
    }
}

fn test_state() -> AppState {
    let engine = Arc::new(StubEngine);
    let stats = Arc::new(StubStats);
    let config_store = Arc::new(StubConfig);
    let network_control = Arc::new(StubNetwork);
    let policy_refresh = Arc::new(StubRefresh);
    let cache_control = Arc::new(StubCache);
    AppState {
        get_status: Arc::new(GetStatusUseCase::new(network_control.clone(), engine)),
        get_statistics: Arc::new(GetStatisticsUseCase::new(stats.clone())),
        get_recent_blocked: Arc::new(GetRecentBlockedUseCase::new(stats)),
        get_config: Arc::new(GetConfigUseCase::new(config_store.clone())),
        update_config: Arc::new(UpdateConfigUseCase::new(config_store)),
        pause: Arc::new(PauseUseCase::new(network_control.clone())),
        resume: Arc::new(ResumeUseCase::new(network_control)),
        refresh_rules: Arc::new(RefreshRulesUseCase::new(policy_refresh)),
        clear_cache: Arc::new(ClearCacheUseCase::new(cache_control)),
        api_keys: Arc::new(StubKeyStore { viewer_token: "viewer-token", admin_token: "admin-token" }),
        rate_limiter: Arc::new(RateLimiter::new(1000, Duration::from_secs(60))),
    }
}

#[tokio::test]
async fn test_health_is_public() {
    let app = dnshield_api::create_api_routes(test_state());
    let response = app.oneshot(Request::get("/api/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_status_requires_bearer_token() {
    let app = dnshield_api::create_api_routes(test_state());
    let response = app.oneshot(Request::get("/api/status").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_viewer_token_cannot_reach_admin_endpoint() {
    let app = dnshield_api::create_api_routes(test_state());
    let response = app
        .oneshot(
            Request::put("/api/config/update")
                .header("Authorization", "Bearer viewer-token")
                .header("Content-Type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_token_reaches_admin_endpoint() {
    let app = dnshield_api::create_api_routes(test_state());
    let response = app
        .oneshot(
            Request::put("/api/config/update")
                .header("Authorization", "Bearer admin-token")
                .header("Content-Type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_viewer_token_can_reach_view_endpoint() {
    let app = dnshield_api::create_api_routes(test_state());
    let response = app
        .oneshot(Request::get("/api/status").header("Authorization", "Bearer viewer-token").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
