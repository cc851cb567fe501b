use async_trait::async_trait;
use dnshield_domain::DnshieldError;

/// Application-layer port for clearing C3 (DNS answer cache) and C8
/// (leaf-certificate cache) from `/api/clear-cache` (§4.13).
#[async_trait]
pub trait CacheControlPort: Send + Sync {
    async fn clear_dns_cache(&self) -> Result<usize, DnshieldError>;

    async fn clear_cert_cache(&self) -> Result<usize, DnshieldError>;
}
