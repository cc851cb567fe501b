use crate::policy::AllowOnlyPrecedence;
use serde::{Deserialize, Serialize};

/// Object-store location and refresh cadence for enterprise policy
/// fetching (§4.10).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolicyConfig {
    /// Enabled only when a bucket is configured; otherwise C11 stays idle
    /// and the device runs on its locally-edited blocklist alone.
    #[serde(default)]
    pub bucket_url: Option<String>,

    #[serde(default = "default_base_prefix")]
    pub base_prefix: String,

    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    #[serde(default = "default_refresh_jitter_secs")]
    pub refresh_jitter_secs: u64,

    #[serde(default = "default_max_object_size_bytes")]
    pub max_object_size_bytes: u64,

    #[serde(default)]
    pub allow_only_precedence: AllowOnlyPrecedence,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            bucket_url: None,
            base_prefix: default_base_prefix(),
            refresh_interval_secs: default_refresh_interval_secs(),
            refresh_jitter_secs: default_refresh_jitter_secs(),
            max_object_size_bytes: default_max_object_size_bytes(),
            allow_only_precedence: AllowOnlyPrecedence::default(),
        }
    }
}

fn default_base_prefix() -> String {
    "policy/".to_string()
}

fn default_refresh_interval_secs() -> u64 {
    300
}

fn default_refresh_jitter_secs() -> u64 {
    30
}

fn default_max_object_size_bytes() -> u64 {
    100 * 1024 * 1024
}
