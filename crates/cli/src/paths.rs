//! Filesystem layout (§6): everything lives under `$HOME/.dnshield/`.
//!
//! `AppConfig`'s sub-configs ship with system-wide defaults
//! (`/var/lib/dnshield/...`) so the crate compiles and validates with no
//! environment at all; this module is what actually steers a fresh
//! install onto the per-user layout the CLI surface documents. A value
//! the user typed into `config.toml` is never second-guessed — only the
//! compiled-in defaults get rewritten.

use dnshield_domain::AppConfig;
use std::path::PathBuf;

pub fn state_dir() -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    home.join(".dnshield")
}

pub fn default_config_path() -> PathBuf {
    state_dir().join("config.toml")
}

/// Rewrites the handful of config paths that still hold their
/// compiled-in system defaults onto `$HOME/.dnshield/...` equivalents.
/// A `config.toml` that explicitly set one of these fields is left
/// untouched.
pub fn apply_state_dir_defaults(config: &mut AppConfig) {
    let dir = state_dir();

    if config.tls.ca_dir == "/var/lib/dnshield/ca" {
        config.tls.ca_dir = dir.join("ca").to_string_lossy().into_owned();
    }
    if config.admin.api_keys_path == "/var/lib/dnshield/api_keys.json" {
        config.admin.api_keys_path = dir.join("api_keys.json").to_string_lossy().into_owned();
    }
}

pub fn network_dns_dir() -> PathBuf {
    state_dir().join("network-dns")
}

pub fn ca_trust_marker() -> PathBuf {
    state_dir().join("ca-trust-installed")
}
