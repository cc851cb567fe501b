//! `dnshield configure-dns [--restore] [--force]`: drives C15 directly,
//! outside of `run`, for manually applying or reverting loopback DNS
//! without starting the listeners.

use dnshield_domain::AppConfig;
use dnshield_infrastructure::network::{LinuxNetworkDetector, LinuxPlatformGlue, NetworkDnsManager};
use std::sync::Arc;

pub struct ConfigureDnsArgs {
    pub restore: bool,
    pub force: bool,
}

pub async fn execute(_config: &AppConfig, args: ConfigureDnsArgs) -> anyhow::Result<()> {
    let manager = NetworkDnsManager::new(Arc::new(LinuxPlatformGlue::new()), Arc::new(LinuxNetworkDetector::new()));
    let dir = crate::paths::network_dns_dir();
    crate::network_state::load_all(&dir, &manager).await;

    if args.restore {
        if !args.force && !manager.status().filtering_active {
            println!("DNS is not currently redirected to dnshield; nothing to restore (pass --force to restore anyway).");
            return Ok(());
        }
        manager.disable_filtering().await?;
        println!("DNS settings restored for the current network.");
    } else {
        manager.enable_filtering().await?;
        println!("DNS on all active interfaces now points at dnshield.");
    }

    crate::network_state::save_all(&dir, &manager).await;
    Ok(())
}
