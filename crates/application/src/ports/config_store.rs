use async_trait::async_trait;
use dnshield_domain::{AppConfig, DnshieldError};

/// The subset of `AppConfig` `/api/config/update` is allowed to touch
/// (§4.13): `allow_pause`/`allow_quit`/`policy_url`/`update_interval`.
/// Every field is optional — only present fields are applied.
#[derive(Debug, Clone, Default)]
pub struct ConfigUpdate {
    pub allow_pause: Option<bool>,
    pub allow_quit: Option<bool>,
    pub policy_url: Option<String>,
    pub update_interval_secs: Option<u64>,
}

/// Application-layer port backing the admin API's config get/update
/// use cases. The implementation persists the updated `config.toml` and
/// applies it to the in-memory `AppConfig` the rest of the system reads.
#[async_trait]
pub trait ConfigStorePort: Send + Sync {
    fn get(&self) -> AppConfig;

    async fn update(&self, patch: ConfigUpdate) -> Result<AppConfig, DnshieldError>;
}
