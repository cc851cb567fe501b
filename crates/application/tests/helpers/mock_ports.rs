#![allow(dead_code)]

use async_trait::async_trait;
use dnshield_application::ports::{
    BlockEnginePort, BlockEngineStats, CacheControlPort, FilterDecision, NetworkControlPort,
    NetworkStatus, PolicyRefreshPort,
};
use dnshield_domain::DnshieldError;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct MockBlockEngine {
    pub blocked: Mutex<Vec<String>>,
    pub allow_only: AtomicBool,
}

#[async_trait]
impl BlockEnginePort for MockBlockEngine {
    fn check(&self, domain: &str) -> FilterDecision {
        if self.blocked.lock().unwrap().iter().any(|d| d == domain) {
            FilterDecision::Block
        } else {
            FilterDecision::Allow
        }
    }

    async fn replace_blocklist(&self, domains: Vec<String>) -> Result<usize, DnshieldError> {
        let mut blocked = self.blocked.lock().unwrap();
        let count = domains.len();
        *blocked = domains;
        Ok(count)
    }

    async fn replace_allowlist(&self, _domains: Vec<String>) -> Result<usize, DnshieldError> {
        Ok(0)
    }

    async fn set_allow_only_mode(&self, enabled: bool) {
        self.allow_only.store(enabled, Ordering::SeqCst);
    }

    fn stats(&self) -> BlockEngineStats {
        BlockEngineStats {
            block_domain_count: self.blocked.lock().unwrap().len(),
            allow_domain_count: 0,
            allow_only_mode: self.allow_only.load(Ordering::SeqCst),
        }
    }
}

#[derive(Default)]
pub struct MockNetworkControl {
    pub paused: AtomicBool,
}

#[async_trait]
impl NetworkControlPort for MockNetworkControl {
    fn status(&self) -> NetworkStatus {
        NetworkStatus {
            network_id: "default".to_string(),
            filtering_active: true,
            paused: self.paused.load(Ordering::SeqCst),
            paused_until: None,
        }
    }

    async fn pause(&self, _duration: Duration) -> Result<(), DnshieldError> {
        self.paused.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn resume(&self) -> Result<(), DnshieldError> {
        self.paused.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockPolicyRefresh {
    pub trigger_count: AtomicUsize,
}

#[async_trait]
impl PolicyRefreshPort for MockPolicyRefresh {
    async fn trigger_refresh(&self) -> Result<(), DnshieldError> {
        self.trigger_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockCacheControl {
    pub dns_cleared: AtomicUsize,
    pub cert_cleared: AtomicUsize,
}

#[async_trait]
impl CacheControlPort for MockCacheControl {
    async fn clear_dns_cache(&self) -> Result<usize, DnshieldError> {
        Ok(self.dns_cleared.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn clear_cert_cache(&self) -> Result<usize, DnshieldError> {
        Ok(self.cert_cleared.fetch_add(1, Ordering::SeqCst) + 1)
    }
}
