use serde::{Deserialize, Serialize};

/// Captive-portal detection tuning (§4.2).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptivePortalConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_threshold")]
    pub threshold: usize,

    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    #[serde(default = "default_bypass_duration_secs")]
    pub bypass_duration_secs: u64,

    /// Parent domains treated as captive-portal probes in addition to the
    /// built-in set (e.g. `captive.apple.com`, `connectivitycheck.gstatic.com`).
    #[serde(default)]
    pub extra_probe_domains: Vec<String>,
}

impl Default for CaptivePortalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: default_threshold(),
            window_secs: default_window_secs(),
            bypass_duration_secs: default_bypass_duration_secs(),
            extra_probe_domains: vec![],
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_threshold() -> usize {
    3
}

fn default_window_secs() -> u64 {
    10
}

fn default_bypass_duration_secs() -> u64 {
    300
}
