//! Response/request bodies for the admin API. Kept distinct from
//! the application-layer port types (`Statistics`, `NetworkStatus`, ...)
//! the same way the reference implementation's `dto/` module stays
//! distinct from its use-case return types.

use dnshield_application::ports::{BlockedEvent, Statistics};
use dnshield_application::use_cases::StatusReport;
use dnshield_domain::{AppConfig, ApiKeyRecord, Role};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub filtering_active: bool,
    pub paused: bool,
    pub paused_until: Option<chrono::DateTime<chrono::Utc>>,
    pub network_id: String,
    pub allow_only_mode: bool,
    pub block_domain_count: usize,
    pub allow_domain_count: usize,
}

impl From<StatusReport> for StatusResponse {
    fn from(report: StatusReport) -> Self {
        Self {
            filtering_active: report.network.filtering_active,
            paused: report.network.paused,
            paused_until: report.network.paused_until,
            network_id: report.network.network_id,
            allow_only_mode: report.allow_only_mode,
            block_domain_count: report.block_domain_count,
            allow_domain_count: report.allow_domain_count,
        }
    }
}

#[derive(Serialize)]
pub struct StatisticsResponse {
    pub queries_total: u64,
    pub blocked_total: u64,
    pub cache_hits_total: u64,
    pub cache_misses_total: u64,
    pub upstream_errors_total: u64,
    pub tls_blocks_total: u64,
}

impl From<Statistics> for StatisticsResponse {
    fn from(s: Statistics) -> Self {
        Self {
            queries_total: s.queries_total,
            blocked_total: s.blocked_total,
            cache_hits_total: s.cache_hits_total,
            cache_misses_total: s.cache_misses_total,
            upstream_errors_total: s.upstream_errors_total,
            tls_blocks_total: s.tls_blocks_total,
        }
    }
}

#[derive(Serialize)]
pub struct BlockedEventResponse {
    pub domain: String,
    pub rule: String,
    pub client_ip: String,
    pub user: Option<String>,
    pub group: Option<String>,
    pub at: chrono::DateTime<chrono::Utc>,
}

impl From<BlockedEvent> for BlockedEventResponse {
    fn from(e: BlockedEvent) -> Self {
        Self { domain: e.domain, rule: e.rule, client_ip: e.client_ip, user: e.user, group: e.group, at: e.at }
    }
}

#[derive(Deserialize, Default)]
pub struct ConfigUpdateRequest {
    pub allow_pause: Option<bool>,
    pub allow_quit: Option<bool>,
    pub policy_url: Option<String>,
    pub update_interval_secs: Option<u64>,
}

#[derive(Serialize)]
pub struct ConfigResponse(pub AppConfig);

#[derive(Deserialize)]
pub struct PauseRequest {
    pub duration_secs: u64,
}

#[derive(Serialize)]
pub struct ApiKeyResponse {
    pub id: String,
    pub label: String,
    pub role: Role,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_used_at: Option<chrono::DateTime<chrono::Utc>>,
    pub revoked: bool,
}

impl From<ApiKeyRecord> for ApiKeyResponse {
    fn from(r: ApiKeyRecord) -> Self {
        Self { id: r.id, label: r.label, role: r.role, created_at: r.created_at, last_used_at: r.last_used_at, revoked: r.revoked }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { error: message.into() }
    }
}
