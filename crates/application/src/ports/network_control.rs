use async_trait::async_trait;
use dnshield_domain::DnshieldError;
use std::time::Duration;

/// Current mode surfaced by `/api/status` (§4.13, §4.14).
#[derive(Debug, Clone)]
pub struct NetworkStatus {
    pub network_id: String,
    pub filtering_active: bool,
    pub paused: bool,
    pub paused_until: Option<chrono::DateTime<chrono::Utc>>,
}

/// Application-layer port for the Network DNS Manager (C15).
#[async_trait]
pub trait NetworkControlPort: Send + Sync {
    fn status(&self) -> NetworkStatus;

    async fn pause(&self, duration: Duration) -> Result<(), DnshieldError>;

    async fn resume(&self) -> Result<(), DnshieldError>;
}
