//! `PlatformGlue`: the one OS-specific seam C15 depends on (§9's
//! explicit recommendation — "only the glue has OS-specific code").
//!
//! Net-new; the reference implementation has no OS-DNS or CA-trust-store
//! concept at all. The Linux implementation here shells out to
//! `resolvectl`/`nmcli` the way a systemd-resolved host expects, with the
//! same strict-argument-validation discipline the spec requires (§4.14:
//! "command arguments are validated against a strict regex").

use async_trait::async_trait;
use dnshield_domain::DnshieldError;
use std::net::IpAddr;
use std::str::FromStr;
use tokio::process::Command;
use tracing::{info, warn};

#[async_trait]
pub trait PlatformGlue: Send + Sync {
    /// Read the currently configured DNS servers and whether they come
    /// from DHCP, for every active interface.
    async fn capture_dns(&self) -> Result<Vec<(String, Vec<String>, bool)>, DnshieldError>;

    /// Point `interface` at `servers` (§4.14: loopback during filtering,
    /// the captured originals during restore).
    async fn set_dns(&self, interface: &str, servers: &[String]) -> Result<(), DnshieldError>;

    async fn install_ca_trust(&self, cert_pem: &str) -> Result<(), DnshieldError>;
    async fn uninstall_ca_trust(&self) -> Result<(), DnshieldError>;
}

/// §4.14: "names alphanumeric+space+`-()`".
fn validate_interface_name(name: &str) -> Result<(), DnshieldError> {
    let valid = !name.is_empty() && name.len() <= 64 && name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '(' | ')'));
    if valid {
        Ok(())
    } else {
        Err(DnshieldError::NetworkDnsFailure(format!("rejected interface name: {name:?}")))
    }
}

/// §4.14: "IP addresses strict dotted-quad or IPv6".
fn validate_ip(addr: &str) -> Result<(), DnshieldError> {
    IpAddr::from_str(addr).map(|_| ()).map_err(|_| DnshieldError::NetworkDnsFailure(format!("rejected DNS server address: {addr:?}")))
}

pub struct LinuxPlatformGlue;

impl LinuxPlatformGlue {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LinuxPlatformGlue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlatformGlue for LinuxPlatformGlue {
    async fn capture_dns(&self) -> Result<Vec<(String, Vec<String>, bool)>, DnshieldError> {
        let output = Command::new("resolvectl")
            .arg("status")
            .arg("--no-pager")
            .output()
            .await
            .map_err(|e| DnshieldError::NetworkDnsFailure(format!("resolvectl status: {e}")))?;

        if !output.status.success() {
            return Err(DnshieldError::NetworkDnsFailure(format!("resolvectl status exited with {}", output.status)));
        }

        Ok(parse_resolvectl_status(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn set_dns(&self, interface: &str, servers: &[String]) -> Result<(), DnshieldError> {
        validate_interface_name(interface)?;
        for server in servers {
            validate_ip(server)?;
        }

        let mut cmd = Command::new("resolvectl");
        cmd.arg("dns").arg(interface);
        if servers.is_empty() {
            cmd.arg("");
        } else {
            cmd.args(servers);
        }

        let status = cmd.status().await.map_err(|e| DnshieldError::NetworkDnsFailure(format!("resolvectl dns: {e}")))?;
        if status.success() {
            info!(interface, ?servers, "updated interface DNS servers");
            Ok(())
        } else {
            Err(DnshieldError::NetworkDnsFailure(format!("resolvectl dns exited with {status}")))
        }
    }

    async fn install_ca_trust(&self, cert_pem: &str) -> Result<(), DnshieldError> {
        let dest = "/usr/local/share/ca-certificates/dnshield-ca.crt";
        tokio::fs::write(dest, cert_pem).await.map_err(DnshieldError::Io)?;
        let status = Command::new("update-ca-certificates")
            .status()
            .await
            .map_err(|e| DnshieldError::NetworkDnsFailure(format!("update-ca-certificates: {e}")))?;
        if status.success() {
            Ok(())
        } else {
            Err(DnshieldError::NetworkDnsFailure(format!("update-ca-certificates exited with {status}")))
        }
    }

    async fn uninstall_ca_trust(&self) -> Result<(), DnshieldError> {
        let dest = "/usr/local/share/ca-certificates/dnshield-ca.crt";
        match tokio::fs::remove_file(dest).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(error = %e, "failed to remove CA trust file");
                return Err(DnshieldError::Io(e));
            }
        }
        let status = Command::new("update-ca-certificates")
            .status()
            .await
            .map_err(|e| DnshieldError::NetworkDnsFailure(format!("update-ca-certificates: {e}")))?;
        if status.success() {
            Ok(())
        } else {
            Err(DnshieldError::NetworkDnsFailure(format!("update-ca-certificates exited with {status}")))
        }
    }
}

/// Parses `resolvectl status` output into `(interface, dns_servers, is_dhcp)`
/// tuples. `is_dhcp` is a heuristic: an interface with a "DHCP4"/"DHCP6"
/// protocol line is treated as DHCP-managed.
fn parse_resolvectl_status(text: &str) -> Vec<(String, Vec<String>, bool)> {
    let mut results = Vec::new();
    let mut current_iface: Option<String> = None;
    let mut current_servers = Vec::new();
    let mut current_dhcp = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("Link ") {
            if let Some(iface) = current_iface.take() {
                results.push((iface, std::mem::take(&mut current_servers), current_dhcp));
            }
            current_iface = rest.split('(').nth(1).map(|s| s.trim_end_matches(')').to_string());
            current_dhcp = false;
        } else if let Some(rest) = trimmed.strip_prefix("DNS Servers:") {
            current_servers.extend(rest.split_whitespace().map(str::to_string));
        } else if trimmed.contains("DHCP4") || trimmed.contains("DHCP6") {
            current_dhcp = true;
        }
    }
    if let Some(iface) = current_iface.take() {
        results.push((iface, current_servers, current_dhcp));
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_interface_name_accepts_typical_names() {
        assert!(validate_interface_name("eth0").is_ok());
        assert!(validate_interface_name("Wi-Fi (2)").is_ok());
    }

    #[test]
    fn test_validate_interface_name_rejects_shell_metacharacters() {
        assert!(validate_interface_name("eth0; rm -rf /").is_err());
        assert!(validate_interface_name("$(whoami)").is_err());
    }

    #[test]
    fn test_validate_ip_accepts_v4_and_v6() {
        assert!(validate_ip("1.1.1.1").is_ok());
        assert!(validate_ip("2001:4860:4860::8888").is_ok());
    }

    #[test]
    fn test_validate_ip_rejects_garbage() {
        assert!(validate_ip("'; drop table dns; --").is_err());
    }

    #[test]
    fn test_parse_resolvectl_status_extracts_servers() {
        let sample = "Link 3 (eth0)\n    Current Scopes: DNS\nProtocols: +DefaultRoute +DHCP4 -DHCP6\n  DNS Servers: 192.168.1.1 192.168.1.2\n";
        let parsed = parse_resolvectl_status(sample);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].0, "eth0");
        assert_eq!(parsed[0].1, vec!["192.168.1.1", "192.168.1.2"]);
        assert!(parsed[0].2);
    }
}
