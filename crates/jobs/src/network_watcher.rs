//! Thin job wrapper around `NetworkDnsManager`'s own watcher loop (C15,
//! §4.14), so it can be registered through `JobRunner` alongside the
//! other background jobs instead of being spawned separately by
//! bootstrap code.

use dnshield_infrastructure::network::NetworkDnsManager;
use std::time::Duration;

pub struct NetworkWatcherJob {
    manager: NetworkDnsManager,
    interval: Duration,
}

impl NetworkWatcherJob {
    pub fn new(manager: NetworkDnsManager) -> Self {
        Self { manager, interval: NetworkDnsManager::default_watcher_interval() }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub async fn start(self) {
        self.manager.spawn_watcher(self.interval);
    }
}
