//! `LinuxNetworkDetector`: resolves the active `NetworkIdentity` and the
//! set of active interfaces, composing the same `ip`/`iwgetid` shell-outs
//! `LinuxPlatformGlue` uses for DNS settings. Kept separate from
//! `PlatformGlue` because it's read-only discovery rather than a DNS or
//! CA-trust mutation, and `NetworkDnsManager` calls it far more often
//! (every watcher tick) than it calls the glue.

use crate::network::dns_manager::NetworkDetector;
use async_trait::async_trait;
use dnshield_domain::network::NetworkIdentity;
use tokio::process::Command;
use tracing::warn;

pub struct LinuxNetworkDetector;

impl LinuxNetworkDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LinuxNetworkDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NetworkDetector for LinuxNetworkDetector {
    async fn detect(&self) -> NetworkIdentity {
        let route = default_route().await;
        let (interface, gateway_ip) = match route {
            Some(pair) => pair,
            None => return NetworkIdentity::default(),
        };
        let gateway_mac = gateway_mac(&gateway_ip).await;
        let ssid = ssid(&interface).await;
        NetworkIdentity::from_parts(ssid.as_deref(), gateway_mac.as_deref(), Some(&gateway_ip), Some(&interface))
    }

    async fn active_interfaces(&self) -> Vec<String> {
        let output = match Command::new("ip").arg("-o").arg("link").arg("show").arg("up").output().await {
            Ok(output) if output.status.success() => output,
            Ok(output) => {
                warn!(status = %output.status, "ip link show up exited non-zero");
                return Vec::new();
            }
            Err(e) => {
                warn!(error = %e, "failed to run ip link show up");
                return Vec::new();
            }
        };
        parse_active_interfaces(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Returns `(interface, gateway_ip)` for the default route, or `None`
/// when there isn't one (offline, or a network with no default gateway).
async fn default_route() -> Option<(String, String)> {
    let output = Command::new("ip").arg("route").arg("show").arg("default").output().await.ok()?;
    if !output.status.success() {
        return None;
    }
    parse_default_route(&String::from_utf8_lossy(&output.stdout))
}

fn parse_default_route(text: &str) -> Option<(String, String)> {
    let line = text.lines().next()?;
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let gateway = tokens.iter().position(|t| *t == "via").and_then(|i| tokens.get(i + 1))?.to_string();
    let interface = tokens.iter().position(|t| *t == "dev").and_then(|i| tokens.get(i + 1))?.to_string();
    Some((interface, gateway))
}

async fn gateway_mac(gateway_ip: &str) -> Option<String> {
    let output = Command::new("ip").arg("neigh").arg("show").arg(gateway_ip).output().await.ok()?;
    if !output.status.success() {
        return None;
    }
    parse_neigh_mac(&String::from_utf8_lossy(&output.stdout))
}

fn parse_neigh_mac(text: &str) -> Option<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.iter().position(|t| *t == "lladdr").and_then(|i| tokens.get(i + 1)).map(|s| s.to_string())
}

/// Wi-Fi SSID for `interface`, or `None` on a wired link or when
/// `iwgetid` isn't installed — both are expected, not errors.
async fn ssid(interface: &str) -> Option<String> {
    let output = Command::new("iwgetid").arg(interface).arg("--raw").output().await.ok()?;
    if !output.status.success() {
        return None;
    }
    let raw = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if raw.is_empty() {
        None
    } else {
        Some(raw)
    }
}

fn parse_active_interfaces(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| line.split(':').nth(1))
        .map(|s| s.trim().to_string())
        .filter(|name| name != "lo" && !name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_route_extracts_interface_and_gateway() {
        let text = "default via 192.168.1.1 dev wlan0 proto dhcp metric 600\n";
        assert_eq!(parse_default_route(text), Some(("wlan0".to_string(), "192.168.1.1".to_string())));
    }

    #[test]
    fn test_parse_default_route_none_when_missing() {
        assert_eq!(parse_default_route(""), None);
    }

    #[test]
    fn test_parse_neigh_mac_extracts_lladdr() {
        let text = "192.168.1.1 dev wlan0 lladdr aa:bb:cc:dd:ee:ff REACHABLE\n";
        assert_eq!(parse_neigh_mac(text), Some("aa:bb:cc:dd:ee:ff".to_string()));
    }

    #[test]
    fn test_parse_active_interfaces_excludes_loopback() {
        let text = "1: lo: <LOOPBACK,UP,LOWER_UP> mtu 65536\n2: eth0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500\n";
        assert_eq!(parse_active_interfaces(text), vec!["eth0".to_string()]);
    }
}
