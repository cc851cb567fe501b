use serde::{Deserialize, Serialize};

/// Logging configuration, deliberately kept to the single field the
/// reference implementation uses — level only, no structured-sink
/// selection (§10.2).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// "trace" | "debug" | "info" | "warn" | "error". Overridable at
    /// runtime via `DNSHIELD_LOG_LEVEL`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
