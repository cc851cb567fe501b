use crate::ports::PolicyRefreshPort;
use dnshield_domain::DnshieldError;
use std::sync::Arc;

/// `POST /api/refresh-rules`: trigger C13 out-of-cycle (§4.13).
pub struct RefreshRulesUseCase {
    refresher: Arc<dyn PolicyRefreshPort>,
}

impl RefreshRulesUseCase {
    pub fn new(refresher: Arc<dyn PolicyRefreshPort>) -> Self {
        Self { refresher }
    }

    pub async fn execute(&self) -> Result<(), DnshieldError> {
        self.refresher.trigger_refresh().await
    }
}
