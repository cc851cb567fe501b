//! `dnshield uninstall [--all]`: removes the CA from the system trust
//! store and, with `--all`, also restores DNS settings for every
//! network this device has captured and deletes `$HOME/.dnshield`.

use dnshield_domain::AppConfig;
use dnshield_infrastructure::network::{LinuxNetworkDetector, LinuxPlatformGlue, NetworkDnsManager, PlatformGlue};
use tracing::info;

pub struct UninstallArgs {
    pub all: bool,
}

pub async fn execute(config: &AppConfig, args: UninstallArgs) -> anyhow::Result<()> {
    let glue = LinuxPlatformGlue::new();
    glue.uninstall_ca_trust().await?;
    let _ = tokio::fs::remove_file(crate::paths::ca_trust_marker()).await;
    info!("root CA removed from the system trust store");

    if args.all {
        let manager = NetworkDnsManager::new(std::sync::Arc::new(LinuxPlatformGlue::new()), std::sync::Arc::new(LinuxNetworkDetector::new()));
        crate::network_state::load_all(&crate::paths::network_dns_dir(), &manager).await;
        manager.disable_filtering().await?;
        tokio::fs::remove_dir_all(crate::paths::state_dir()).await.or_else(|e| {
            if e.kind() == std::io::ErrorKind::NotFound { Ok(()) } else { Err(e) }
        })?;
        info!(ca_dir = %config.tls.ca_dir, "DNS settings restored and dnshield state removed");
        println!("dnshield fully uninstalled: DNS settings restored, CA trust removed, state directory deleted.");
    } else {
        println!("CA trust removed. DNS settings and configuration were left untouched (pass --all to remove everything).");
    }

    Ok(())
}
