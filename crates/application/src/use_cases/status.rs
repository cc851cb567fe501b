use crate::ports::{BlockEnginePort, NetworkControlPort, NetworkStatus};
use std::sync::Arc;

/// Backs `GET /api/status`: current filtering mode plus network info.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub network: NetworkStatus,
    pub block_domain_count: usize,
    pub allow_domain_count: usize,
    pub allow_only_mode: bool,
}

pub struct GetStatusUseCase {
    network: Arc<dyn NetworkControlPort>,
    block_engine: Arc<dyn BlockEnginePort>,
}

impl GetStatusUseCase {
    pub fn new(network: Arc<dyn NetworkControlPort>, block_engine: Arc<dyn BlockEnginePort>) -> Self {
        Self { network, block_engine }
    }

    pub fn execute(&self) -> StatusReport {
        let stats = self.block_engine.stats();
        StatusReport {
            network: self.network.status(),
            block_domain_count: stats.block_domain_count,
            allow_domain_count: stats.allow_domain_count,
            allow_only_mode: stats.allow_only_mode,
        }
    }
}
