//! `dnshield install-ca`: generates (or loads) the root CA and installs
//! its certificate into the system trust store, per §4.7.

use dnshield_domain::AppConfig;
use dnshield_infrastructure::network::{LinuxPlatformGlue, PlatformGlue};
use dnshield_infrastructure::tls::CaManager;
use tracing::info;

pub async fn execute(config: &AppConfig) -> anyhow::Result<()> {
    let ca_manager = CaManager::load_or_generate(&config.tls.ca_dir)?;
    let glue = LinuxPlatformGlue::new();
    glue.install_ca_trust(&ca_manager.identity().cert_pem).await?;
    tokio::fs::write(crate::paths::ca_trust_marker(), b"installed").await?;

    info!(ca_dir = %config.tls.ca_dir, "root CA installed into the system trust store");
    println!("Root CA installed. Its certificate now lives in the system trust store.");
    Ok(())
}
