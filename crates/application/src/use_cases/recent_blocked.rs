use crate::ports::{BlockedEvent, StatsPort};
use std::sync::Arc;

/// `/api/recent-blocked` caps at 20 regardless of what the caller asks
/// for (§4.13).
const MAX_LIMIT: usize = 20;

pub struct GetRecentBlockedUseCase {
    stats: Arc<dyn StatsPort>,
}

impl GetRecentBlockedUseCase {
    pub fn new(stats: Arc<dyn StatsPort>) -> Self {
        Self { stats }
    }

    pub fn execute(&self, limit: usize) -> Vec<BlockedEvent> {
        self.stats.recent_blocked(limit.min(MAX_LIMIT))
    }
}
