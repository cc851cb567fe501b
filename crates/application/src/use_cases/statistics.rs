use crate::ports::{Statistics, StatsPort};
use std::sync::Arc;

/// Backs `GET /api/statistics`.
pub struct GetStatisticsUseCase {
    stats: Arc<dyn StatsPort>,
}

impl GetStatisticsUseCase {
    pub fn new(stats: Arc<dyn StatsPort>) -> Self {
        Self { stats }
    }

    pub fn execute(&self) -> Statistics {
        self.stats.snapshot()
    }
}
