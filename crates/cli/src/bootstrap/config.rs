use dnshield_domain::config::CliOverrides;
use dnshield_domain::AppConfig;
use std::path::Path;
use tracing::info;

/// Loads and validates the layered config (§10.1's file → env → CLI order
/// lives inside `AppConfig::load` itself). A parse or validation failure
/// is fatal at startup, matching the reference implementation's
/// `load_config`.
pub fn load_config(config_path: &Path, cli_overrides: CliOverrides) -> anyhow::Result<AppConfig> {
    let config = AppConfig::load(config_path, &cli_overrides)?;
    config.validate()?;

    info!(
        config_file = %config_path.display(),
        dns_bind = %config.dns.bind_address,
        admin_bind = %config.admin.bind_address,
        "configuration loaded"
    );

    Ok(config)
}
