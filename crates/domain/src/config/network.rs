use serde::{Deserialize, Serialize};

/// Network-DNS watcher cadence and the system-DNS takeover default (§4.14).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    #[serde(default = "default_watcher_interval_secs")]
    pub watcher_interval_secs: u64,

    #[serde(default = "default_true")]
    pub auto_configure_dns: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            watcher_interval_secs: default_watcher_interval_secs(),
            auto_configure_dns: true,
        }
    }
}

fn default_watcher_interval_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}
