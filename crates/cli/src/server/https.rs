//! Binds the HTTPS block server (C9) on `tls.bind_address`.

use crate::di::CoreServices;
use dnshield_domain::{AppConfig, DnshieldError};
use std::net::SocketAddr;

pub async fn run(config: &AppConfig, core: &CoreServices) -> Result<(), DnshieldError> {
    let bind_address: SocketAddr = config
        .tls
        .bind_address
        .parse()
        .map_err(|e| DnshieldError::config(format!("tls.bind_address: {e}")))?;

    dnshield_infrastructure::tls::block_server::run(bind_address, core.cert_resolver.clone(), core.stats.clone()).await
}
