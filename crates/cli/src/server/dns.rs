//! Binds the plaintext DNS listener (C5) against a [`DnsHandler`] built
//! from the wired core services.

use crate::di::CoreServices;
use dnshield_domain::{AppConfig, DnshieldError};
use dnshield_infrastructure::dns::DnsHandler;
use std::net::SocketAddr;

pub async fn run(config: &AppConfig, core: &CoreServices) -> Result<(), DnshieldError> {
    let bind_address: SocketAddr = config
        .dns
        .bind_address
        .parse()
        .map_err(|e| DnshieldError::config(format!("dns.bind_address: {e}")))?;

    let handler_config = crate::di::handler_config(config)?;
    let handler = DnsHandler::new(
        core.block_engine.clone(),
        core.captive_portal.clone(),
        core.dns_cache.clone(),
        core.upstream.clone(),
        core.rate_limiter.clone(),
        core.stats.clone(),
        handler_config,
    );

    dnshield_infrastructure::dns::listener::run(bind_address, handler).await
}
