//! C8 — Certificate Generator: on-demand leaf-cert minting with a
//! per-SNI cache and single-flight generation.
//!
//! Grounded on `cert_manager.rs`'s `issue_leaf_cert`/`server_config_for_host`
//! for the mint-then-cache shape; the single-flight map is built to the
//! shape the design notes recommend directly (§9: "a map SNI → Future
//! where a second caller subscribes to an in-flight generation"), since
//! the teacher has no certificate-minting code to ground it on.

use crate::tls::ca_manager::{leaf_params, CaManager};
use dashmap::DashMap;
use dnshield_domain::{DnshieldError, LeafCertEntry};
use rcgen::KeyPair;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

const MIN_CACHE_MARGIN: Duration = Duration::from_secs(30);

pub struct CertGenerator {
    ca: Arc<CaManager>,
    cache: DashMap<String, Arc<LeafCertEntry>>,
    in_flight: DashMap<String, Arc<Mutex<()>>>,
    validity: Duration,
    wildcard_san: bool,
}

impl CertGenerator {
    pub fn new(ca: Arc<CaManager>, validity: Duration, wildcard_san: bool) -> Self {
        Self {
            ca,
            cache: DashMap::new(),
            in_flight: DashMap::new(),
            validity,
            wildcard_san,
        }
    }

    /// §4.8's full algorithm. Concurrent calls for the same `sni` share
    /// one generation via the per-SNI mutex in `in_flight`.
    pub async fn get_certificate(&self, sni: &str) -> Result<Arc<LeafCertEntry>, DnshieldError> {
        let now = Instant::now();
        if let Some(entry) = self.cache.get(sni) {
            if entry.is_fresh(now) {
                return Ok(entry.clone());
            }
        }

        let lock = self
            .in_flight
            .entry(sni.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Re-check: another caller may have finished generating while we waited.
        if let Some(entry) = self.cache.get(sni) {
            if entry.is_fresh(Instant::now()) {
                self.in_flight.remove(sni);
                return Ok(entry.clone());
            }
        }

        let entry = Arc::new(self.mint(sni)?);
        self.cache.insert(sni.to_string(), entry.clone());
        self.in_flight.remove(sni);
        info!(sni, not_after = %entry.not_after, "minted leaf certificate");
        Ok(entry)
    }

    fn mint(&self, sni: &str) -> Result<LeafCertEntry, DnshieldError> {
        let params = leaf_params(sni, self.validity, self.wildcard_san)?;
        let not_after = params.not_after;
        let leaf_key = KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256).map_err(|e| DnshieldError::CertMintFailure { sni: sni.to_string(), reason: e.to_string() })?;
        let leaf_der = self.ca.sign_leaf(params, &leaf_key)?;

        let cache_window = self.validity.saturating_sub(MIN_CACHE_MARGIN).max(MIN_CACHE_MARGIN);
        let cache_expires_at = Instant::now() + cache_window;

        Ok(LeafCertEntry {
            cert_chain_der: vec![leaf_der, self.ca.identity().cert_der.clone()],
            key_der: leaf_key.serialize_der(),
            not_after: chrono::DateTime::from_timestamp(not_after.unix_timestamp(), 0).unwrap_or_else(chrono::Utc::now),
            cache_expires_at,
        })
    }

    /// Background sweep target (§4.8: "removes entries where
    /// cache_expires_at < now every 30 s").
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.cache.len();
        self.cache.retain(|_, entry| entry.is_fresh(now));
        before - self.cache.len()
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// `/api/clear-cache` target (§4.13): drop every cached leaf cert.
    pub fn clear_all(&self) -> usize {
        let count = self.cache.len();
        self.cache.clear();
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tls::ca_manager::CaManager;
    use tempfile::tempdir;

    fn generator() -> CertGenerator {
        let dir = tempdir().unwrap();
        let ca = Arc::new(CaManager::load_or_generate(dir.path()).unwrap());
        CertGenerator::new(ca, Duration::from_secs(300), false)
    }

    #[tokio::test]
    async fn test_get_certificate_caches_on_second_call() {
        let gen = generator();
        let first = gen.get_certificate("example.com").await.unwrap();
        let second = gen.get_certificate("example.com").await.unwrap();
        assert_eq!(first.key_der, second.key_der);
        assert_eq!(gen.cached_count(), 1);
    }

    #[tokio::test]
    async fn test_different_sni_generates_independently() {
        let gen = generator();
        let a = gen.get_certificate("a.example").await.unwrap();
        let b = gen.get_certificate("b.example").await.unwrap();
        assert_ne!(a.key_der, b.key_der);
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired_entries() {
        let gen = generator();
        gen.get_certificate("example.com").await.unwrap();
        assert_eq!(gen.sweep_expired(), 0);
        assert_eq!(gen.cached_count(), 1);
    }
}
