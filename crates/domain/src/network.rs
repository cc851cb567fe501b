//! `NetworkIdentity`/`NetworkDNSConfig` (§3, §4.14).
//!
//! Net-new — the reference implementation has no network-DNS-capture
//! concept. Keying follows the design note in §9: "when no per-network
//! identity can be computed, fall back to a single 'default' network key."

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Stable identity for the network currently in use, derived from
/// whatever subset of (SSID, gateway MAC, gateway IP, interface) the
/// platform glue can observe. `Default` is used when none of those can
/// be determined.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NetworkIdentity(String);

impl NetworkIdentity {
    pub const DEFAULT: &'static str = "default";

    pub fn from_parts(ssid: Option<&str>, gateway_mac: Option<&str>, gateway_ip: Option<&str>, interface: Option<&str>) -> Self {
        if ssid.is_none() && gateway_mac.is_none() && gateway_ip.is_none() && interface.is_none() {
            return Self::default();
        }
        let mut hasher = rustc_hash_stable_hasher();
        ssid.hash(&mut hasher);
        gateway_mac.hash(&mut hasher);
        gateway_ip.hash(&mut hasher);
        interface.hash(&mut hasher);
        NetworkIdentity(format!("net-{:016x}", hasher.finish()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NetworkIdentity {
    fn default() -> Self {
        NetworkIdentity(Self::DEFAULT.to_string())
    }
}

/// A small deterministic hasher so `NetworkIdentity` derivation doesn't
/// need to pull in a hashing crate purely for this one call site.
fn rustc_hash_stable_hasher() -> std::collections::hash_map::DefaultHasher {
    std::collections::hash_map::DefaultHasher::new()
}

/// Captured original DNS settings for one network, persisted at
/// `network-dns/network-<id>.json` (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkDnsConfig {
    pub network_id: String,
    pub captured_servers: Vec<String>,
    pub is_dhcp: bool,
    pub captured_at: chrono::DateTime<chrono::Utc>,
    pub last_seen: chrono::DateTime<chrono::Utc>,
    pub times_seen: u64,
}
