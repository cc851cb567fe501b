use async_trait::async_trait;
use dnshield_domain::DnshieldError;

/// Application-layer port letting `/api/refresh-rules` (§4.13) kick the
/// Rule Update Job (C13) out of its normal cadence.
#[async_trait]
pub trait PolicyRefreshPort: Send + Sync {
    async fn trigger_refresh(&self) -> Result<(), DnshieldError>;
}
