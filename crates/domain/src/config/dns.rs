use serde::{Deserialize, Serialize};

/// DNS resolution settings (§4.4, §4.6).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsConfig {
    #[serde(default = "default_upstream_servers")]
    pub upstream_servers: Vec<String>,

    #[serde(default = "default_upstream_timeout_ms")]
    pub upstream_timeout_ms: u64,

    /// Address returned for blocked A queries (§4.4 edge cases).
    #[serde(default = "default_sinkhole_ipv4")]
    pub sinkhole_ipv4: String,

    #[serde(default = "default_block_ttl")]
    pub block_ttl: u32,

    /// Bind address for the plaintext listener (port 53).
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            upstream_servers: default_upstream_servers(),
            upstream_timeout_ms: default_upstream_timeout_ms(),
            sinkhole_ipv4: default_sinkhole_ipv4(),
            block_ttl: default_block_ttl(),
            bind_address: default_bind_address(),
        }
    }
}

fn default_upstream_servers() -> Vec<String> {
    vec!["1.1.1.1:53".to_string(), "8.8.8.8:53".to_string()]
}

fn default_upstream_timeout_ms() -> u64 {
    2_000
}

fn default_sinkhole_ipv4() -> String {
    "0.0.0.0".to_string()
}

fn default_block_ttl() -> u32 {
    60
}

fn default_bind_address() -> String {
    "0.0.0.0:53".to_string()
}
