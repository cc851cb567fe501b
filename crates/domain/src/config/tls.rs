use serde::{Deserialize, Serialize};

/// CA and leaf-certificate settings (§4.7, §4.8).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    #[serde(default = "default_ca_dir")]
    pub ca_dir: String,

    /// Leaf-cert validity window in seconds (§4.8: "default 5 min; absolute
    /// max 1 hour"). Clamped to that ceiling by [`super::AppConfig::validate`].
    #[serde(default = "default_leaf_validity_secs")]
    pub leaf_validity_secs: i64,

    #[serde(default = "default_leaf_cache_size")]
    pub leaf_cache_size: usize,

    #[serde(default = "default_leaf_cache_ttl_secs")]
    pub leaf_cache_ttl_secs: u64,

    /// Whether minted leaf certs also carry a wildcard SAN for the
    /// requested SNI's parent domain (reduces repeat minting for sites
    /// that use many subdomains under one registrable domain).
    #[serde(default)]
    pub wildcard_san: bool,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            ca_dir: default_ca_dir(),
            leaf_validity_secs: default_leaf_validity_secs(),
            leaf_cache_size: default_leaf_cache_size(),
            leaf_cache_ttl_secs: default_leaf_cache_ttl_secs(),
            wildcard_san: false,
            bind_address: default_bind_address(),
        }
    }
}

fn default_ca_dir() -> String {
    "/var/lib/dnshield/ca".to_string()
}

fn default_leaf_validity_secs() -> i64 {
    300
}

pub const LEAF_VALIDITY_MAX_SECS: i64 = 3_600;

fn default_leaf_cache_size() -> usize {
    2_048
}

fn default_leaf_cache_ttl_secs() -> u64 {
    3_600
}

fn default_bind_address() -> String {
    "0.0.0.0:443".to_string()
}
