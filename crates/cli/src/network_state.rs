//! Persists `NetworkDnsManager`'s captured-DNS snapshots to
//! `network-dns/network-<id>.json` (§6), one file per network, the way
//! `FileApiKeyStore` persists `api_keys.json` — write to a temp file,
//! `chmod(0600)`, then rename over the target.

use dnshield_domain::network::NetworkDnsConfig;
use dnshield_infrastructure::network::NetworkDnsManager;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::warn;

fn network_file(dir: &Path, network_id: &str) -> PathBuf {
    dir.join(format!("network-{network_id}.json"))
}

/// Loads every `network-*.json` file under `dir` and seeds them into
/// `manager`. Missing directory or unreadable individual files are
/// logged and skipped rather than treated as fatal — a fresh install has
/// no captures yet.
pub async fn load_all(dir: &Path, manager: &NetworkDnsManager) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
        Err(e) => {
            warn!(error = %e, dir = %dir.display(), "failed to list network-dns directory");
            return;
        }
    };

    let mut configs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let parsed = fs::read(&path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| serde_json::from_slice::<NetworkDnsConfig>(&bytes).map_err(|e| e.to_string()));
        match parsed {
            Ok(config) => configs.push(config),
            Err(e) => warn!(error = %e, path = %path.display(), "skipping unreadable network-dns snapshot"),
        }
    }

    if !configs.is_empty() {
        manager.seed_captured(configs).await;
    }
}

/// Writes every currently-captured network's snapshot back to disk.
/// Called periodically and at shutdown from `commands::run`.
pub async fn save_all(dir: &Path, manager: &NetworkDnsManager) {
    for config in manager.captured_snapshot().await {
        let path = network_file(dir, &config.network_id);
        if let Err(e) = write_snapshot(&path, &config) {
            warn!(error = %e, path = %path.display(), "failed to persist network-dns snapshot");
        }
    }
}

fn write_snapshot(path: &Path, config: &NetworkDnsConfig) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_vec_pretty(config)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
    fs::rename(&tmp, path)
}
