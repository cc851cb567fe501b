use crate::ports::CacheControlPort;
use dnshield_domain::DnshieldError;
use std::sync::Arc;

/// `POST /api/clear-cache`: clear C3 and C8 caches (§4.13).
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearCacheOutcome {
    pub dns_entries_cleared: usize,
    pub cert_entries_cleared: usize,
}

pub struct ClearCacheUseCase {
    cache: Arc<dyn CacheControlPort>,
}

impl ClearCacheUseCase {
    pub fn new(cache: Arc<dyn CacheControlPort>) -> Self {
        Self { cache }
    }

    pub async fn execute(&self) -> Result<ClearCacheOutcome, DnshieldError> {
        let dns_entries_cleared = self.cache.clear_dns_cache().await?;
        let cert_entries_cleared = self.cache.clear_cert_cache().await?;
        Ok(ClearCacheOutcome { dns_entries_cleared, cert_entries_cleared })
    }
}
