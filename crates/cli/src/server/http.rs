//! Binds the plain-HTTP redirector (C10) on the same interface as the
//! HTTPS block server, port 80 — there is no separate config knob for it
//! since the two always sit on the same address (§6).

use dnshield_domain::{AppConfig, DnshieldError};
use std::net::SocketAddr;

pub async fn run(config: &AppConfig) -> Result<(), DnshieldError> {
    let tls_addr: SocketAddr = config
        .tls
        .bind_address
        .parse()
        .map_err(|e| DnshieldError::config(format!("tls.bind_address: {e}")))?;
    let bind_address = SocketAddr::new(tls_addr.ip(), 80);

    dnshield_infrastructure::tls::redirector::run(bind_address).await
}
