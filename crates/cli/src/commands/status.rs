//! `dnshield status`: a liveness probe against the admin API's loopback
//! port. The admin surface requires a bearer token for everything past
//! `/api/health`, and tokens aren't recoverable from `api_keys.json`
//! (only their hash is stored) once issued, so this only reports
//! whether a daemon is listening rather than fetching full statistics —
//! use `/api/status` directly with a saved token for that.

use dnshield_domain::AppConfig;
use std::time::Duration;
use tokio::net::TcpStream;

pub async fn execute(config: &AppConfig) -> anyhow::Result<()> {
    let running = tokio::time::timeout(Duration::from_secs(2), TcpStream::connect(&config.admin.bind_address)).await.is_ok_and(|r| r.is_ok());

    if running {
        println!("dnshield is running (admin API reachable at {})", config.admin.bind_address);
        println!("dns: {}  tls: {}", config.dns.bind_address, config.tls.bind_address);
    } else {
        println!("dnshield does not appear to be running (admin API at {} unreachable)", config.admin.bind_address);
    }

    Ok(())
}
