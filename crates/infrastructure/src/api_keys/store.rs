//! File-backed `ApiKeyStorePort`: issues, validates, and revokes the
//! bearer tokens the admin API's auth middleware checks (§10.5).
//!
//! Net-new; the reference implementation has no API-key concept (its
//! admin surface is unauthenticated). Persistence follows
//! [`crate::tls::ca_manager`]'s temp-file-then-rename-then-chmod pattern
//! for `api_keys.json`, and token generation reuses `fastrand` the same
//! way the rest of this crate does for jittered timings, here for
//! generating unguessable secret bytes instead.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use dnshield_application::ports::ApiKeyStorePort;
use dnshield_domain::{ApiKeyRecord, DnshieldError, Role};
use sha2::{Digest, Sha256};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

const TOKEN_BYTES: usize = 32;

pub struct FileApiKeyStore {
    path: PathBuf,
    records: Mutex<Vec<ApiKeyRecord>>,
}

impl FileApiKeyStore {
    pub fn load_or_create(path: impl Into<PathBuf>) -> Result<Self, DnshieldError> {
        let path = path.into();
        let records = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| DnshieldError::Config(format!("api_keys.json is corrupt: {e}")))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(DnshieldError::Io(e)),
        };
        let store = Self { path, records: Mutex::new(records) };
        store.persist()?;
        Ok(store)
    }

    fn persist(&self) -> Result<(), DnshieldError> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let json = serde_json::to_vec_pretty(&*records).map_err(|e| DnshieldError::Config(format!("failed to serialize api_keys.json: {e}")))?;
        write_with_mode(&self.path, &json, 0o600)
    }

    fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex_encode(&hasher.finalize())
    }
}

#[async_trait::async_trait]
impl ApiKeyStorePort for FileApiKeyStore {
    fn validate(&self, token: &str) -> Option<ApiKeyRecord> {
        let hash = Self::hash_token(token);
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let record = records.iter_mut().find(|r| constant_time_eq(r.token_hash.as_bytes(), hash.as_bytes()) && r.is_usable())?;
        record.mark_used(chrono::Utc::now());
        let found = record.clone();
        drop(records);
        if let Err(e) = self.persist() {
            warn!(error = %e, "failed to persist api_keys.json after marking key used");
        }
        Some(found)
    }

    async fn create(&self, label: String, role: Role) -> Result<(ApiKeyRecord, String), DnshieldError> {
        let token = generate_token();
        let record = ApiKeyRecord::new(generate_id(), label, Self::hash_token(&token), role, chrono::Utc::now());

        {
            let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
            records.push(record.clone());
        }
        self.persist()?;
        Ok((record, token))
    }

    async fn revoke(&self, id: &str) -> Result<(), DnshieldError> {
        {
            let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
            let record = records.iter_mut().find(|r| r.id == id).ok_or_else(|| DnshieldError::Config(format!("no api key with id {id}")))?;
            record.revoke();
        }
        self.persist()
    }

    fn list(&self) -> Vec<ApiKeyRecord> {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

fn generate_token() -> String {
    let bytes: Vec<u8> = (0..TOKEN_BYTES).map(|_| fastrand::u8(..)).collect();
    format!("dnshield_{}", URL_SAFE_NO_PAD.encode(bytes))
}

fn generate_id() -> String {
    let bytes: Vec<u8> = (0..8).map(|_| fastrand::u8(..)).collect();
    hex_encode(&bytes)
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut acc, b| {
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

/// §10.5: "comparison is constant-time" — an XOR-accumulate that never
/// short-circuits on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn write_with_mode(path: &Path, contents: &[u8], mode: u32) -> Result<(), DnshieldError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(DnshieldError::Io)?;
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, contents).map_err(DnshieldError::Io)?;
    fs::set_permissions(&tmp_path, fs::Permissions::from_mode(mode)).map_err(DnshieldError::Io)?;
    fs::rename(&tmp_path, path).map_err(DnshieldError::Io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_create_then_validate_round_trips() {
        let dir = tempdir().unwrap();
        let store = FileApiKeyStore::load_or_create(dir.path().join("api_keys.json")).unwrap();

        let (record, token) = store.create("laptop".to_string(), Role::Operator).await.unwrap();
        let validated = store.validate(&token).unwrap();
        assert_eq!(validated.id, record.id);
        assert_eq!(validated.role, Role::Operator);
    }

    #[tokio::test]
    async fn test_revoked_key_fails_validation() {
        let dir = tempdir().unwrap();
        let store = FileApiKeyStore::load_or_create(dir.path().join("api_keys.json")).unwrap();

        let (record, token) = store.create("laptop".to_string(), Role::Viewer).await.unwrap();
        store.revoke(&record.id).await.unwrap();
        assert!(store.validate(&token).is_none());
    }

    #[tokio::test]
    async fn test_unknown_token_fails_validation() {
        let dir = tempdir().unwrap();
        let store = FileApiKeyStore::load_or_create(dir.path().join("api_keys.json")).unwrap();
        assert!(store.validate("not-a-real-token").is_none());
    }

    #[tokio::test]
    async fn test_store_reloads_persisted_keys_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("api_keys.json");
        let store = FileApiKeyStore::load_or_create(&path).unwrap();
        let (_record, token) = store.create("laptop".to_string(), Role::Admin).await.unwrap();
        drop(store);

        let reloaded = FileApiKeyStore::load_or_create(&path).unwrap();
        assert!(reloaded.validate(&token).is_some());
    }

    #[test]
    fn test_constant_time_eq_rejects_length_mismatch_and_content_mismatch() {
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(constant_time_eq(b"abc", b"abc"));
    }
}
