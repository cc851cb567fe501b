//! Configuration module, organized by concern (§10.1).
//!
//! Layout mirrors the reference implementation's `domain::config` tree
//! (one file per sub-config, a `mod.rs` aggregator) but the sub-configs
//! themselves are this crate's own — there is no ad-blocking/database/
//! upstream-pool config here, and there is a policy/tls/captive_portal/
//! admin/network layer the reference implementation never had.

pub mod admin;
pub mod blocklist;
pub mod cache;
pub mod captive_portal;
pub mod dns;
pub mod logging;
pub mod network;
pub mod policy;
pub mod tls;

pub use admin::AdminApiConfig;
pub use blocklist::BlocklistConfig;
pub use cache::CacheConfig;
pub use captive_portal::CaptivePortalConfig;
pub use dns::DnsConfig;
pub use logging::LoggingConfig;
pub use network::NetworkConfig;
pub use policy::PolicyConfig;
pub use tls::TlsConfig;

use crate::errors::DnshieldError;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

/// The full runtime configuration tree, one sub-config per concern
/// (§10.1). Every field has a default, so a missing `config.toml`
/// produces a usable (if unconfigured-for-enterprise-policy) config.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub dns: DnsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub tls: TlsConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub blocklist: BlocklistConfig,
    #[serde(default)]
    pub captive_portal: CaptivePortalConfig,
    #[serde(default)]
    pub admin: AdminApiConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// CLI-flag overrides applied after the file and environment layers
/// (§10.1's layering order), mirroring the reference implementation's
/// `CliOverrides` struct.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub dns_bind_address: Option<String>,
    pub admin_bind_address: Option<String>,
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Load `config.toml` if present, apply `DNSHIELD_*` environment
    /// overrides, then `cli_overrides`, returning the fully layered config.
    /// A missing file is not an error; a malformed one is.
    pub fn load(path: &Path, cli_overrides: &CliOverrides) -> Result<Self, DnshieldError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(DnshieldError::Io)?;
            toml::from_str::<AppConfig>(&raw).map_err(|e| DnshieldError::config(format!("{path:?}: {e}")))?
        } else {
            AppConfig::default()
        };

        config.apply_env_overrides();

        if let Some(addr) = &cli_overrides.dns_bind_address {
            config.dns.bind_address = addr.clone();
        }
        if let Some(addr) = &cli_overrides.admin_bind_address {
            config.admin.bind_address = addr.clone();
        }
        if let Some(level) = &cli_overrides.log_level {
            config.logging.level = level.clone();
        }

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("DNSHIELD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(addr) = std::env::var("DNSHIELD_DNS_BIND_ADDRESS") {
            self.dns.bind_address = addr;
        }
        if let Ok(addr) = std::env::var("DNSHIELD_ADMIN_BIND_ADDRESS") {
            self.admin.bind_address = addr;
        }
    }

    /// Checked before the config is used anywhere (§10.1): port/interval
    /// sanity and the loopback-only admin bind requirement.
    pub fn validate(&self) -> Result<(), DnshieldError> {
        let admin_addr: SocketAddr = self
            .admin
            .bind_address
            .parse()
            .map_err(|e| DnshieldError::config(format!("admin.bind_address: {e}")))?;
        if !is_loopback(admin_addr.ip()) {
            return Err(DnshieldError::config(
                "admin.bind_address must be a loopback address",
            ));
        }

        self.dns
            .bind_address
            .parse::<SocketAddr>()
            .map_err(|e| DnshieldError::config(format!("dns.bind_address: {e}")))?;
        self.tls
            .bind_address
            .parse::<SocketAddr>()
            .map_err(|e| DnshieldError::config(format!("tls.bind_address: {e}")))?;

        if self.dns.upstream_timeout_ms == 0 {
            return Err(DnshieldError::config("dns.upstream_timeout_ms must be positive"));
        }
        if self.cache.sweep_interval_secs == 0 {
            return Err(DnshieldError::config("cache.sweep_interval_secs must be positive"));
        }
        if self.policy.refresh_interval_secs == 0 {
            return Err(DnshieldError::config("policy.refresh_interval_secs must be positive"));
        }
        if self.network.watcher_interval_secs == 0 {
            return Err(DnshieldError::config("network.watcher_interval_secs must be positive"));
        }
        if self.tls.leaf_validity_secs <= 0 {
            return Err(DnshieldError::config("tls.leaf_validity_secs must be positive"));
        }
        if self.tls.leaf_validity_secs > crate::config::tls::LEAF_VALIDITY_MAX_SECS {
            return Err(DnshieldError::config("tls.leaf_validity_secs exceeds the 1-hour maximum"));
        }

        Ok(())
    }
}

fn is_loopback(ip: IpAddr) -> bool {
    ip.is_loopback()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        AppConfig::default().validate().expect("defaults must be valid");
    }

    #[test]
    fn test_non_loopback_admin_bind_rejected() {
        let mut config = AppConfig::default();
        config.admin.bind_address = "0.0.0.0:8787".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = AppConfig::default();
        config.dns.upstream_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = AppConfig::load(&path, &CliOverrides::default()).unwrap();
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_cli_override_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();
        let overrides = CliOverrides {
            log_level: Some("debug".to_string()),
            ..Default::default()
        };
        let config = AppConfig::load(&path, &overrides).unwrap();
        assert_eq!(config.logging.level, "debug");
    }
}
