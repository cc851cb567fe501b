//! `/api/clear-cache` (§4.13) spans two independently-owned caches — the
//! DNS answer cache (C3) and the leaf-certificate cache (C8) — so this
//! adapter just forwards to both rather than living inside either module.

use crate::dns::DnsCache;
use crate::tls::CertGenerator;
use async_trait::async_trait;
use dnshield_application::ports::CacheControlPort;
use dnshield_domain::DnshieldError;
use std::sync::Arc;

pub struct CacheControl {
    dns_cache: Arc<DnsCache>,
    cert_generator: Arc<CertGenerator>,
}

impl CacheControl {
    pub fn new(dns_cache: Arc<DnsCache>, cert_generator: Arc<CertGenerator>) -> Self {
        Self { dns_cache, cert_generator }
    }
}

#[async_trait]
impl CacheControlPort for CacheControl {
    async fn clear_dns_cache(&self) -> Result<usize, DnshieldError> {
        let count = self.dns_cache.len();
        self.dns_cache.clear();
        Ok(count)
    }

    async fn clear_cert_cache(&self) -> Result<usize, DnshieldError> {
        Ok(self.cert_generator.clear_all())
    }
}
