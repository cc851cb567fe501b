//! Binds the admin API (§4.13) on the loopback-only `admin.bind_address`,
//! with `ConnectInfo` enabled so `middleware::rate_limit` can key its
//! sliding window per client.

use dnshield_api::AppState;
use dnshield_domain::{AppConfig, DnshieldError};
use std::net::SocketAddr;

pub async fn run(config: &AppConfig, state: AppState) -> Result<(), DnshieldError> {
    let bind_address: SocketAddr = config
        .admin
        .bind_address
        .parse()
        .map_err(|e| DnshieldError::config(format!("admin.bind_address: {e}")))?;

    let app = dnshield_api::create_api_routes(state);
    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .map_err(|e| DnshieldError::BindFailure { addr: bind_address.to_string(), source: e })?;

    tracing::info!(%bind_address, "admin API bound");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|e| DnshieldError::BindFailure { addr: bind_address.to_string(), source: e })
}
