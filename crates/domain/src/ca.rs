//! `CAIdentity` (§3, §4.7).
//!
//! Kept as raw DER/PEM bytes rather than a `rustls`/`rcgen` type so this
//! crate stays decoupled from the TLS stack choice; the infrastructure
//! crate's `tls::ca_manager` is the only place that parses/signs with these
//! bytes (grounded on `cert_manager.rs`'s `CertManager`).

/// The locally-trusted root CA: certificate, private key, and the
/// certificate re-encoded as PEM for `install()`/display purposes.
/// Never mutated after creation (§3 lifecycle).
pub struct CaIdentity {
    pub cert_der: Vec<u8>,
    pub key_der: Vec<u8>,
    pub cert_pem: String,
}

impl CaIdentity {
    pub fn new(cert_der: Vec<u8>, key_der: Vec<u8>, cert_pem: String) -> Self {
        Self { cert_der, key_der, cert_pem }
    }
}

impl std::fmt::Debug for CaIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material (Invariant 7 — no secret leaks into logs).
        f.debug_struct("CaIdentity")
            .field("cert_der_len", &self.cert_der.len())
            .field("key_der", &"<redacted>")
            .finish()
    }
}
