use thiserror::Error;

/// Error kinds spanning the whole workspace, one variant per row of the
/// error-handling table (policy/source annotated in each `#[error]` message).
///
/// Grounded on the reference implementation's `DomainError` (one flat
/// `thiserror` enum shared by every crate rather than per-crate error types).
#[derive(Debug, Error)]
pub enum DnshieldError {
    #[error("too many domains in rule update: {0} exceeds the configured maximum")]
    TooManyDomains(usize),

    #[error("ambiguous device identity: {0} user entries match this device")]
    AmbiguousDevice(usize),

    #[error("invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("bind failure on {addr}: {source}")]
    BindFailure {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CA load/generate failure: {0}")]
    CaLoadFailure(String),

    #[error("certificate mint failure for {sni}: {reason}")]
    CertMintFailure { sni: String, reason: String },

    #[error("policy fetch failed: {0}")]
    PolicyFetchFailure(String),

    #[error("blocklist source fetch/parse failed: {0}")]
    BlocklistSourceFailure(String),

    #[error("yaml validation failed for {file}: {reason}")]
    YamlValidationFailure { file: String, reason: String },

    #[error("response from {source} exceeded the maximum allowed size ({max} bytes)")]
    OversizeResponse { source: String, max: u64 },

    #[error("SSRF guard rejected {url}: {reason}")]
    SsrfRejected { url: String, reason: String },

    #[error("OS DNS operation failed: {0}")]
    NetworkDnsFailure(String),

    #[error("admin authentication failed")]
    AdminAuthFailure,

    #[error("admin rate limit exceeded")]
    AdminRateLimited,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl DnshieldError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
