use dnshield_domain::AppConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initializes the global `tracing` subscriber from `LoggingConfig.level`,
/// parsed the same permissive way the reference implementation does
/// (`level.parse().unwrap_or(Level::INFO)`) so a typo in `config.toml`
/// degrades to info-level logging rather than panicking at startup.
/// `RUST_LOG`/`DNSHIELD_LOG_LEVEL` still take precedence via `EnvFilter`.
pub fn init_logging(config: &AppConfig) {
    let level = config.logging.level.parse().unwrap_or(tracing::Level::INFO);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    tracing_subscriber::fmt().with_target(true).with_thread_ids(false).with_level(true).with_env_filter(filter).init();

    info!(level = %config.logging.level, "logging initialized");
}
