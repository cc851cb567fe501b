//! Upstream resolver pool — races the configured upstream servers and
//! returns the first reply (§4.4 step 5).
//!
//! Grounded on `dns/load_balancer/parallel.rs`'s `ParallelStrategy`
//! (`FuturesUnordered` race over per-server tasks), simplified to the
//! spec's "first to respond wins" semantics only — no pools, no
//! conditional-forwarding table, no TCP-retry-on-truncation fallback.

use dnshield_domain::DnshieldError;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::debug;

pub struct UpstreamPool {
    servers: Vec<SocketAddr>,
    per_upstream_timeout: Duration,
}

impl UpstreamPool {
    pub fn new(servers: Vec<SocketAddr>, per_upstream_timeout: Duration) -> Self {
        Self { servers, per_upstream_timeout }
    }

    /// Send `query_bytes` (a wire-encoded DNS message) to every upstream
    /// in parallel; return the first successfully decoded reply.
    pub async fn query(&self, query_bytes: &[u8]) -> Result<Vec<u8>, DnshieldError> {
        if self.servers.is_empty() {
            return Err(DnshieldError::Other("no upstream servers configured".to_string()));
        }

        let mut futs = FuturesUnordered::new();
        for &server in &self.servers {
            let query_bytes = query_bytes.to_vec();
            let per_upstream_timeout = self.per_upstream_timeout;
            futs.push(async move { query_one(server, &query_bytes, per_upstream_timeout).await });
        }

        while let Some(result) = futs.next().await {
            match result {
                Ok(bytes) => return Ok(bytes),
                Err(e) => debug!(error = %e, "upstream query failed"),
            }
        }

        Err(DnshieldError::Other("all upstream servers failed".to_string()))
    }
}

async fn query_one(server: SocketAddr, query_bytes: &[u8], per_upstream_timeout: Duration) -> Result<Vec<u8>, DnshieldError> {
    let bind_addr: SocketAddr = if server.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" }.parse().unwrap();
    let socket = UdpSocket::bind(bind_addr).await.map_err(DnshieldError::Io)?;
    socket.connect(server).await.map_err(DnshieldError::Io)?;

    timeout(per_upstream_timeout, async {
        socket.send(query_bytes).await.map_err(DnshieldError::Io)?;
        let mut buf = vec![0u8; 4096];
        let len = socket.recv(&mut buf).await.map_err(DnshieldError::Io)?;
        buf.truncate(len);
        Ok(buf)
    })
    .await
    .map_err(|_| DnshieldError::Other(format!("upstream {server} timed out")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_upstreams_configured_errors_immediately() {
        let pool = UpstreamPool::new(vec![], Duration::from_millis(100));
        let result = pool.query(&[0u8; 12]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_upstream_times_out_with_error() {
        // TEST-NET-1, reserved for documentation, never answers.
        let pool = UpstreamPool::new(vec!["192.0.2.1:53".parse().unwrap()], Duration::from_millis(50));
        let result = pool.query(&[0u8; 12]).await;
        assert!(result.is_err());
    }
}
