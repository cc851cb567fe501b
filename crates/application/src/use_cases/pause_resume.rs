use crate::ports::NetworkControlPort;
use dnshield_domain::DnshieldError;
use std::sync::Arc;
use std::time::Duration;

/// `POST /api/pause`: `{duration}` → `C15.pause(d)` (§4.13).
pub struct PauseUseCase {
    network: Arc<dyn NetworkControlPort>,
}

impl PauseUseCase {
    pub fn new(network: Arc<dyn NetworkControlPort>) -> Self {
        Self { network }
    }

    pub async fn execute(&self, duration: Duration) -> Result<(), DnshieldError> {
        self.network.pause(duration).await
    }
}

/// `POST /api/resume`: `C15.resume()` (§4.13).
pub struct ResumeUseCase {
    network: Arc<dyn NetworkControlPort>,
}

impl ResumeUseCase {
    pub fn new(network: Arc<dyn NetworkControlPort>) -> Self {
        Self { network }
    }

    pub async fn execute(&self) -> Result<(), DnshieldError> {
        self.network.resume().await
    }
}
