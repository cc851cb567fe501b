use async_trait::async_trait;
use dnshield_domain::DnshieldError;

/// Outcome of a single filter check (C1), grounded on the reference
/// implementation's `FilterDecision`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Block,
    Allow,
}

/// Counters describing the currently active snapshot, surfaced by
/// `/api/statistics` and `/api/status`.
#[derive(Debug, Clone, Copy)]
pub struct BlockEngineStats {
    pub block_domain_count: usize,
    pub allow_domain_count: usize,
    pub allow_only_mode: bool,
}

/// Application-layer port for the Block Filter Engine (C1).
///
/// `check` is synchronous — the active snapshot lives behind an
/// `ArcSwap`, so a read never blocks a concurrent reload. `replace_*`
/// and `set_allow_only_mode` build a new snapshot and swap it in.
#[async_trait]
pub trait BlockEnginePort: Send + Sync {
    fn check(&self, domain: &str) -> FilterDecision;

    async fn replace_blocklist(&self, domains: Vec<String>) -> Result<usize, DnshieldError>;

    async fn replace_allowlist(&self, domains: Vec<String>) -> Result<usize, DnshieldError>;

    async fn set_allow_only_mode(&self, enabled: bool);

    /// Records which user/group the active snapshot was resolved for
    /// (surfaced by `/api/status`); set by the rule updater after every
    /// enterprise-policy refresh.
    async fn update_metadata(&self, user: Option<String>, group: Option<String>);

    fn stats(&self) -> BlockEngineStats;
}
