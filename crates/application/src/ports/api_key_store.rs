use async_trait::async_trait;
use dnshield_domain::{ApiKeyRecord, DnshieldError, Role};

/// Application-layer port for the API-Key Store (§10.5), used by the
/// admin API's auth middleware (validate) and the CLI's `apikey`
/// subcommand (create/revoke/list).
#[async_trait]
pub trait ApiKeyStorePort: Send + Sync {
    /// Look up the key record whose hash matches `token`, if any, and
    /// whose `revoked` flag is unset. Comparison is constant-time.
    fn validate(&self, token: &str) -> Option<ApiKeyRecord>;

    async fn create(&self, label: String, role: Role) -> Result<(ApiKeyRecord, String), DnshieldError>;

    async fn revoke(&self, id: &str) -> Result<(), DnshieldError>;

    fn list(&self) -> Vec<ApiKeyRecord>;
}
