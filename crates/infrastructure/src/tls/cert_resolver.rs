//! `rustls::server::ResolvesServerCert` impl wiring C9's SNI callback to
//! C8's cache.
//!
//! Grounded on `ferron/setup-tls.rs`'s per-host resolver pattern
//! (`CustomSniResolver`/`ResolvesServerCert` keyed by hostname), adapted
//! to call into a single `CertGenerator` rather than juggling a
//! per-port resolver table (this system serves one block page on one
//! port, not a virtual-host table).

use crate::tls::cert_generator::CertGenerator;
use rustls::crypto::aws_lc_rs::sign::any_supported_type;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::server::{ClientHello, ResolvesServerCert};
use rustls::sign::CertifiedKey;
use std::sync::Arc;
use tracing::warn;

pub struct SniCertResolver {
    generator: Arc<CertGenerator>,
}

impl SniCertResolver {
    pub fn new(generator: Arc<CertGenerator>) -> Self {
        Self { generator }
    }
}

impl std::fmt::Debug for SniCertResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SniCertResolver").finish()
    }
}

impl ResolvesServerCert for SniCertResolver {
    fn resolve(&self, client_hello: ClientHello<'_>) -> Option<Arc<CertifiedKey>> {
        let sni = client_hello.server_name()?.to_string();

        // `CertGenerator::get_certificate` only awaits an uncontended
        // `tokio::sync::Mutex` and synchronous signing work, so driving it
        // with a bare executor here (no reactor, no timers) is safe and
        // avoids re-entering the listener's tokio runtime from this
        // synchronous rustls callback.
        let entry = match futures::executor::block_on(self.generator.get_certificate(&sni)) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(sni, error = %e, "leaf certificate mint failed during handshake");
                return None;
            }
        };

        let chain: Vec<CertificateDer<'static>> = entry.cert_chain_der.iter().map(|der| CertificateDer::from(der.clone())).collect();
        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(entry.key_der.clone()));

        let signing_key = match any_supported_type(&key) {
            Ok(key) => key,
            Err(e) => {
                warn!(sni, error = %e, "failed to load leaf signing key");
                return None;
            }
        };

        Some(Arc::new(CertifiedKey::new(chain, signing_key)))
    }
}
