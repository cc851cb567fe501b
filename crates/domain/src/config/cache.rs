use serde::{Deserialize, Serialize};

/// Answer-cache sizing and sweep cadence (§4.3).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Upstream-supplied TTLs above this are capped (seconds).
    #[serde(default = "default_max_ttl_secs")]
    pub max_ttl_secs: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            sweep_interval_secs: default_sweep_interval_secs(),
            max_ttl_secs: default_max_ttl_secs(),
        }
    }
}

fn default_max_entries() -> usize {
    50_000
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_max_ttl_secs() -> u32 {
    3_600
}
