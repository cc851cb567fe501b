pub mod cache_sweep;
pub mod cert_sweep;
pub mod network_watcher;
pub mod rule_updater;
pub mod runner;

pub use cache_sweep::CacheSweepJob;
pub use cert_sweep::CertSweepJob;
pub use network_watcher::NetworkWatcherJob;
pub use rule_updater::RuleUpdaterJob;
pub use runner::JobRunner;
