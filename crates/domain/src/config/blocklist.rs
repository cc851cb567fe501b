use serde::{Deserialize, Serialize};

/// External blocklist-source fetching limits (§4.11, §4.12).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlocklistConfig {
    #[serde(default = "default_max_source_size_bytes")]
    pub max_source_size_bytes: u64,

    #[serde(default = "default_allowed_ports")]
    pub allowed_ports: Vec<u16>,

    /// When true, a source with no recorded checksum is rejected rather
    /// than ingested unverified.
    #[serde(default)]
    pub require_checksum: bool,
}

impl Default for BlocklistConfig {
    fn default() -> Self {
        Self {
            max_source_size_bytes: default_max_source_size_bytes(),
            allowed_ports: default_allowed_ports(),
            require_checksum: false,
        }
    }
}

fn default_max_source_size_bytes() -> u64 {
    50 * 1024 * 1024
}

fn default_allowed_ports() -> Vec<u16> {
    vec![80, 443, 8080, 8443]
}
