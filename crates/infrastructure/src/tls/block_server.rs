//! C9 — HTTPS Block Server: TLS listener on :443 that terminates the
//! handshake with a freshly minted leaf cert and serves a static block
//! page for every request (§4.9).
//!
//! Grounded on `cert_manager.rs`'s `ServerConfig::builder().with_single_cert`
//! plumbing (here swapped for `with_cert_resolver` so each SNI gets its
//! own cert via C8) and on the reference implementation's plain
//! `TcpListener::accept` loop shape used for its own DNS/TCP listener.

use crate::stats::StatsCollector;
use crate::tls::cert_resolver::SniCertResolver;
use dnshield_domain::DnshieldError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::TlsAcceptor;
use tracing::{debug, warn};

const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn run(bind_address: SocketAddr, resolver: Arc<SniCertResolver>, stats: Arc<StatsCollector>) -> Result<(), DnshieldError> {
    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(|e| DnshieldError::BindFailure { addr: bind_address.to_string(), source: e })?;

    let mut server_config = ServerConfig::builder()
        .with_no_client_auth()
        .with_cert_resolver(resolver);
    server_config.alpn_protocols = vec![b"http/1.1".to_vec()];
    let acceptor = TlsAcceptor::from(Arc::new(server_config));

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "block server accept failed");
                continue;
            }
        };
        let acceptor = acceptor.clone();
        let stats = stats.clone();
        tokio::spawn(async move {
            if let Err(e) = serve_one(stream, peer, acceptor, stats).await {
                debug!(error = %e, %peer, "block server connection ended with error");
            }
        });
    }
}

async fn serve_one(
    stream: tokio::net::TcpStream,
    peer: SocketAddr,
    acceptor: TlsAcceptor,
    stats: Arc<StatsCollector>,
) -> std::io::Result<()> {
    let mut tls_stream = acceptor.accept(stream).await?;

    let sni = {
        let (_, conn) = tls_stream.get_ref();
        conn.server_name().unwrap_or("unknown").to_string()
    };

    // Drain whatever the client sent; contents are ignored since every
    // request gets the same response regardless of method/path.
    let mut buf = [0u8; 4096];
    let _ = tls_stream.read(&mut buf).await;

    stats.record_tls_blocked(&sni, peer.ip());

    let body = render_block_page(&sni);
    let response = format!(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: text/html; charset=utf-8\r\n\
         Cache-Control: no-cache, no-store, must-revalidate\r\n\
         X-Content-Type-Options: nosniff\r\n\
         X-Frame-Options: DENY\r\n\
         Content-Security-Policy: default-src 'self'; style-src 'unsafe-inline'\r\n\
         X-Blocked-Domain: {sanitized}\r\n\
         Content-Length: {len}\r\n\
         Connection: close\r\n\
         \r\n\
         {body}",
        sanitized = sanitize_domain(&sni),
        len = body.len(),
    );

    tls_stream.write_all(response.as_bytes()).await?;
    tls_stream.shutdown().await
}

/// §4.9: "restricted to `[A-Za-z0-9.\-:]`" for the response header value.
fn sanitize_domain(domain: &str) -> String {
    domain.chars().filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':')).collect()
}

fn html_escape(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#39;".to_string(),
            other => other.to_string(),
        })
        .collect()
}

fn render_block_page(domain: &str) -> String {
    let safe_domain = html_escape(&sanitize_domain(domain));
    let timestamp = chrono::Utc::now().to_rfc3339();
    format!(
        "<!DOCTYPE html>\n\
<html lang=\"en\">\n\
<head><meta charset=\"utf-8\"><title>Blocked</title></head>\n\
<body>\n\
<h1>This site is blocked</h1>\n\
<p><strong>Domain:</strong> {safe_domain}</p>\n\
<p><strong>Reason:</strong> matched an active block rule</p>\n\
<p><strong>Timestamp:</strong> {timestamp}</p>\n\
<p><strong>Version:</strong> {CRATE_VERSION}</p>\n\
</body>\n\
</html>\n"
    )
}
