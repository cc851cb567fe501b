use serde::{Deserialize, Serialize};

/// Admin API bind/rate-limit settings (§4.13).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminApiConfig {
    /// Enforced loopback by [`super::AppConfig::validate`] — the admin
    /// surface never listens beyond the device itself.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,

    #[serde(default = "default_api_keys_path")]
    pub api_keys_path: String,

    /// User-facing permission toggles editable via `/api/config/update`
    /// (§4.13) — they gate whether `/api/pause` and the CLI's uninstall
    /// path are allowed at all, independent of the caller's role.
    #[serde(default = "default_true")]
    pub allow_pause: bool,

    #[serde(default = "default_true")]
    pub allow_quit: bool,
}

impl Default for AdminApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            rate_limit_per_minute: default_rate_limit_per_minute(),
            api_keys_path: default_api_keys_path(),
            allow_pause: true,
            allow_quit: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> String {
    "127.0.0.1:8787".to_string()
}

fn default_rate_limit_per_minute() -> u32 {
    120
}

fn default_api_keys_path() -> String {
    "/var/lib/dnshield/api_keys.json".to_string()
}
