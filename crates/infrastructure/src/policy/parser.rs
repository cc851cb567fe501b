//! C12 — Blocklist Parser: fetches each `block_sources` URL and parses
//! exact-domain/hosts-format entries (§4.11).
//!
//! Line-parsing grounded on `block_filter/compiler.rs`'s `parse_list_line`,
//! trimmed to this spec's grammar (no `*.wildcard`/`/pattern/` syntax — C12
//! only names exact-domain and hosts-format lines). The SSRF guard and
//! checksum verification are net-new; the teacher fetches from
//! admin-configured URLs with no host-resolution check at all.

use dnshield_domain::config::BlocklistConfig;
use dnshield_domain::DnshieldError;
use sha2::{Digest, Sha256};
use std::net::{IpAddr, ToSocketAddrs};
use tracing::warn;
use url::Url;

pub struct BlocklistParser {
    client: reqwest::Client,
    config: BlocklistConfig,
}

impl BlocklistParser {
    pub fn new(config: BlocklistConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("reqwest client build"),
            config,
        }
    }

    /// §4.11 steps 1–4 for one source URL. A checksum mismatch, fetch
    /// error, or SSRF-guard rejection is returned to the caller, which
    /// (per §4.12) logs a warning and continues with the other sources.
    pub async fn fetch_and_parse(&self, url: &str, expected_sha256: Option<&str>) -> Result<Vec<String>, DnshieldError> {
        validate_url(url, &self.config.allowed_ports)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DnshieldError::BlocklistSourceFailure(format!("{url}: {e}")))?;

        if !response.status().is_success() {
            return Err(DnshieldError::BlocklistSourceFailure(format!("{url}: HTTP {}", response.status())));
        }

        let bytes = response.bytes().await.map_err(|e| DnshieldError::BlocklistSourceFailure(format!("{url}: {e}")))?;
        if bytes.len() as u64 > self.config.max_source_size_bytes {
            return Err(DnshieldError::OversizeResponse { source: url.to_string(), max: self.config.max_source_size_bytes });
        }

        if let Some(expected) = expected_sha256 {
            verify_checksum(&bytes, expected, url)?;
        } else if self.config.require_checksum {
            return Err(DnshieldError::BlocklistSourceFailure(format!("{url}: checksum required but none supplied")));
        }

        let text = String::from_utf8_lossy(&bytes);
        Ok(parse_list_text(&text))
    }
}

fn verify_checksum(bytes: &[u8], expected_hex: &str, url: &str) -> Result<(), DnshieldError> {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let actual = encode_hex(&hasher.finalize());
    if actual.eq_ignore_ascii_case(expected_hex) {
        Ok(())
    } else {
        Err(DnshieldError::BlocklistSourceFailure(format!("{url}: checksum mismatch (expected {expected_hex}, got {actual})")))
    }
}

fn encode_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut acc, b| {
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

/// §4.11 step 1: scheme/port allowlist plus SSRF guard on every resolved
/// address for the host.
fn validate_url(raw: &str, allowed_ports: &[u16]) -> Result<(), DnshieldError> {
    let url = Url::parse(raw).map_err(|e| DnshieldError::SsrfRejected { url: raw.to_string(), reason: format!("unparseable URL: {e}") })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(DnshieldError::SsrfRejected { url: raw.to_string(), reason: format!("unsupported scheme {}", url.scheme()) });
    }

    let port = url.port_or_known_default().unwrap_or(0);
    if !allowed_ports.contains(&port) {
        return Err(DnshieldError::SsrfRejected { url: raw.to_string(), reason: format!("port {port} not in the allowed list") });
    }

    let host = url.host_str().ok_or_else(|| DnshieldError::SsrfRejected { url: raw.to_string(), reason: "missing host".to_string() })?;
    let lookup_target = format!("{host}:{port}");
    let resolved: Vec<IpAddr> = lookup_target
        .to_socket_addrs()
        .map_err(|e| DnshieldError::SsrfRejected { url: raw.to_string(), reason: format!("DNS resolution failed: {e}") })?
        .map(|addr| addr.ip())
        .collect();

    if resolved.is_empty() {
        return Err(DnshieldError::SsrfRejected { url: raw.to_string(), reason: "host resolved to no addresses".to_string() });
    }

    for ip in resolved {
        if is_disallowed_target(ip) {
            return Err(DnshieldError::SsrfRejected { url: raw.to_string(), reason: format!("resolved address {ip} is private/loopback/link-local") });
        }
    }

    Ok(())
}

fn is_disallowed_target(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback() || v4.is_link_local() || v4.is_broadcast() || v4.is_unspecified(),
        IpAddr::V6(v6) => v6.is_loopback() || v6.is_unspecified() || is_unique_local(v6) || (v6.segments()[0] & 0xffc0) == 0xfe80,
    }
}

fn is_unique_local(v6: std::net::Ipv6Addr) -> bool {
    (v6.segments()[0] & 0xfe00) == 0xfc00
}

/// §4.11 step 3's line grammar: exact domain, or hosts-format taking the
/// second whitespace-separated field (skipping self-referential hosts
/// entries).
fn parse_list_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
        return None;
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() >= 2 {
        let domain = parts[1];
        if matches!(domain, "localhost" | "0.0.0.0" | "broadcasthost" | "ip6-localhost" | "ip6-loopback") || !domain.contains('.') {
            return None;
        }
        return Some(domain.to_ascii_lowercase());
    }

    if parts.len() == 1 && parts[0].contains('.') {
        return Some(parts[0].to_ascii_lowercase());
    }

    None
}

fn parse_list_text(text: &str) -> Vec<String> {
    text.lines().filter_map(parse_list_line).collect()
}
