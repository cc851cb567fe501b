//! C10 — HTTP Redirector: plain-HTTP listener on :80 that 301s every
//! request to the HTTPS equivalent (§4.9).

use dnshield_domain::DnshieldError;
use std::net::SocketAddr;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tracing::{debug, warn};

pub async fn run(bind_address: SocketAddr) -> Result<(), DnshieldError> {
    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(|e| DnshieldError::BindFailure { addr: bind_address.to_string(), source: e })?;

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "redirector accept failed");
                continue;
            }
        };
        tokio::spawn(async move {
            if let Err(e) = serve_one(stream).await {
                debug!(error = %e, %peer, "redirector connection ended with error");
            }
        });
    }
}

async fn serve_one(stream: tokio::net::TcpStream) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    let request_target = request_line.split_whitespace().nth(1).unwrap_or("/").to_string();

    let mut host = String::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 || line == "\r\n" || line.is_empty() {
            break;
        }
        if let Some(value) = line.strip_prefix("Host:").or_else(|| line.strip_prefix("host:")) {
            host = value.trim().to_string();
            break;
        }
    }

    let location = format!("https://{host}{request_target}");
    let response = format!(
        "HTTP/1.1 301 Moved Permanently\r\n\
         Location: {location}\r\n\
         Content-Length: 0\r\n\
         Connection: close\r\n\
         \r\n"
    );

    let stream = reader.into_inner();
    let mut stream = stream;
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

#[cfg(test)]
mod tests {
    // Wiring is exercised end-to-end in the workspace's integration tests;
    // the response-construction logic above has no independently
    // testable unit beyond what those flows already cover.
}
