//! C7 — CA Manager: load-or-generate the locally-trusted root CA and
//! sign leaf certificates for C8.
//!
//! Grounded on `cert_manager.rs`'s `CertManager::new`/`generate_root`,
//! adapted to the spec's exact CA shape (ECDSA P-384, basicConstraints
//! pathLenConstraint=0, 2-year validity, NotBefore = now - 1 min) and
//! its atomic-create file lock for first-run generation.

use dnshield_domain::{CaIdentity, DnshieldError};
use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose,
    Ia5String, IsCa, KeyPair, KeyUsagePurpose, SanType,
};
use std::fs;
use std::io::ErrorKind;
use std::net::IpAddr;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{info, warn};

const CA_CERT_FILENAME: &str = "ca-cert.pem";
const CA_KEY_FILENAME: &str = "ca-key.pem";
const LOCK_FILENAME: &str = ".ca-generate.lock";
const CA_VALIDITY_YEARS: i64 = 2;

pub struct CaManager {
    identity: CaIdentity,
    ca_params: CertificateParams,
    ca_key: KeyPair,
}

impl CaManager {
    /// §4.7 steps 1–3: load an existing CA pair if present, else generate
    /// one under an exclusive-create lock file and persist it.
    pub fn load_or_generate(ca_dir: impl AsRef<Path>) -> Result<Self, DnshieldError> {
        let ca_dir = ca_dir.as_ref();
        fs::create_dir_all(ca_dir).map_err(|e| DnshieldError::CaLoadFailure(format!("creating {}: {e}", ca_dir.display())))?;

        let cert_path = ca_dir.join(CA_CERT_FILENAME);
        let key_path = ca_dir.join(CA_KEY_FILENAME);

        if cert_path.exists() && key_path.exists() {
            return Self::load(&cert_path, &key_path);
        }

        let _lock = acquire_lock(ca_dir)?;
        // Re-check: another process may have generated the CA while we waited.
        if cert_path.exists() && key_path.exists() {
            return Self::load(&cert_path, &key_path);
        }

        info!(ca_dir = %ca_dir.display(), "generating new root CA");
        let (params, key) = generate_root();
        let cert = params
            .self_signed(&key)
            .map_err(|e| DnshieldError::CaLoadFailure(format!("self-signing root CA: {e}")))?;
        let cert_pem = cert.pem();
        let key_pem = key.serialize_pem();

        write_with_mode(&cert_path, cert_pem.as_bytes(), 0o644)?;
        write_with_mode(&key_path, key_pem.as_bytes(), 0o600)?;

        Ok(Self {
            identity: CaIdentity::new(cert.der().to_vec(), key.serialize_der(), cert_pem),
            ca_params: params,
            ca_key: key,
        })
    }

    fn load(cert_path: &Path, key_path: &Path) -> Result<Self, DnshieldError> {
        let cert_pem = fs::read_to_string(cert_path).map_err(|e| DnshieldError::CaLoadFailure(format!("reading {}: {e}", cert_path.display())))?;
        let key_pem = fs::read_to_string(key_path).map_err(|e| DnshieldError::CaLoadFailure(format!("reading {}: {e}", key_path.display())))?;

        let ca_key = KeyPair::from_pem(&key_pem).map_err(|e| DnshieldError::CaLoadFailure(format!("parsing CA key: {e}")))?;
        let params = CertificateParams::from_ca_cert_pem(&cert_pem).map_err(|e| DnshieldError::CaLoadFailure(format!("parsing CA cert: {e}")))?;
        let cert = params
            .clone()
            .self_signed(&ca_key)
            .map_err(|e| DnshieldError::CaLoadFailure(format!("reconstructing CA cert: {e}")))?;

        info!("loaded existing root CA");
        Ok(Self {
            identity: CaIdentity::new(cert.der().to_vec(), ca_key.serialize_der(), cert_pem),
            ca_params: params,
            ca_key,
        })
    }

    pub fn identity(&self) -> &CaIdentity {
        &self.identity
    }

    /// §4.7's `sign_leaf`: signs a caller-supplied template with the CA
    /// key, which never leaves this component.
    pub fn sign_leaf(&self, params: CertificateParams, leaf_key: &KeyPair) -> Result<Vec<u8>, DnshieldError> {
        let cert = params
            .signed_by(leaf_key, &self.reconstruct_ca_cert()?, &self.ca_key)
            .map_err(|e| DnshieldError::CertMintFailure { sni: "<leaf>".to_string(), reason: e.to_string() })?;
        Ok(cert.der().to_vec())
    }

    fn reconstruct_ca_cert(&self) -> Result<rcgen::Certificate, DnshieldError> {
        self.ca_params
            .clone()
            .self_signed(&self.ca_key)
            .map_err(|e| DnshieldError::CaLoadFailure(format!("reconstructing CA cert for signing: {e}")))
    }
}

fn generate_root() -> (CertificateParams, KeyPair) {
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, "dnshield Local CA");
    dn.push(DnType::OrganizationName, "dnshield");

    let mut params = CertificateParams::default();
    params.distinguished_name = dn;
    params.is_ca = IsCa::Ca(BasicConstraints::Constrained(0));
    params.key_usages = vec![KeyUsagePurpose::DigitalSignature, KeyUsagePurpose::KeyCertSign];

    let now = OffsetDateTime::now_utc();
    params.not_before = now.checked_sub(time::Duration::minutes(1)).unwrap_or(now);
    params.not_after = now.checked_add(time::Duration::days(365 * CA_VALIDITY_YEARS)).unwrap_or(now);

    let key_pair = KeyPair::generate_for(&rcgen::PKCS_ECDSA_P384_SHA384).expect("failed to generate CA key");
    (params, key_pair)
}

fn acquire_lock(ca_dir: &Path) -> Result<LockGuard, DnshieldError> {
    let lock_path = ca_dir.join(LOCK_FILENAME);
    for _ in 0..50 {
        match fs::OpenOptions::new().write(true).create_new(true).open(&lock_path) {
            Ok(_) => return Ok(LockGuard { path: lock_path }),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => std::thread::sleep(Duration::from_millis(100)),
            Err(e) => return Err(DnshieldError::CaLoadFailure(format!("acquiring CA generation lock: {e}"))),
        }
    }
    Err(DnshieldError::CaLoadFailure("timed out waiting for CA generation lock".to_string()))
}

struct LockGuard {
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(error = %e, path = %self.path.display(), "failed to remove CA generation lock");
        }
    }
}

fn write_with_mode(path: &Path, contents: &[u8], mode: u32) -> Result<(), DnshieldError> {
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, contents).map_err(DnshieldError::Io)?;
    fs::set_permissions(&tmp_path, fs::Permissions::from_mode(mode)).map_err(DnshieldError::Io)?;
    fs::rename(&tmp_path, path).map_err(DnshieldError::Io)
}

/// Builds a leaf-cert `CertificateParams` for `sni`, used by C8 before
/// calling [`CaManager::sign_leaf`]. Kept here since it needs the same
/// `rcgen` types the CA signing step does.
pub fn leaf_params(sni: &str, validity: Duration, wildcard_san: bool) -> Result<CertificateParams, DnshieldError> {
    let mut params = CertificateParams::default();

    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, sni);
    params.distinguished_name = dn;

    params.subject_alt_names = if let Ok(ip) = IpAddr::from_str(sni) {
        vec![SanType::IpAddress(ip)]
    } else {
        let mut sans = vec![SanType::DnsName(
            Ia5String::try_from(sni).map_err(|_| DnshieldError::CertMintFailure { sni: sni.to_string(), reason: "invalid SNI for SAN".to_string() })?,
        )];
        if wildcard_san {
            if let Some((_, parent)) = sni.split_once('.') {
                if let Ok(wildcard) = Ia5String::try_from(format!("*.{parent}")) {
                    sans.push(SanType::DnsName(wildcard));
                }
            }
        }
        sans
    };

    params.key_usages = vec![KeyUsagePurpose::DigitalSignature, KeyUsagePurpose::KeyEncipherment];
    params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];

    let now = OffsetDateTime::now_utc();
    params.not_before = now.checked_sub(time::Duration::minutes(1)).unwrap_or(now);
    params.not_after = now
        .checked_add(time::Duration::seconds(validity.as_secs() as i64))
        .unwrap_or(now);

    Ok(params)
}

pub fn identity_cert_chain(identity: &CaIdentity) -> Arc<Vec<u8>> {
    Arc::new(identity.cert_der.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_generates_ca_once_and_reuses_existing_files() {
        let dir = tempdir().unwrap();
        let pem_first = {
            let manager = CaManager::load_or_generate(dir.path()).expect("initial generation");
            manager.identity().cert_pem.clone()
        };
        let manager_again = CaManager::load_or_generate(dir.path()).expect("reuse existing");
        assert_eq!(manager_again.identity().cert_pem, pem_first);
    }

    #[test]
    fn test_sign_leaf_produces_der_signed_by_ca() {
        let dir = tempdir().unwrap();
        let manager = CaManager::load_or_generate(dir.path()).unwrap();
        let params = leaf_params("example.com", Duration::from_secs(300), false).unwrap();
        let leaf_key = KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256).unwrap();
        let der = manager.sign_leaf(params, &leaf_key).unwrap();
        assert!(!der.is_empty());
    }
}
