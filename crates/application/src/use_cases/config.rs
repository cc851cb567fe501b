use crate::ports::{ConfigStorePort, ConfigUpdate};
use dnshield_domain::{AppConfig, DnshieldError};
use std::sync::Arc;

pub struct GetConfigUseCase {
    store: Arc<dyn ConfigStorePort>,
}

impl GetConfigUseCase {
    pub fn new(store: Arc<dyn ConfigStorePort>) -> Self {
        Self { store }
    }

    pub fn execute(&self) -> AppConfig {
        self.store.get()
    }
}

pub struct UpdateConfigUseCase {
    store: Arc<dyn ConfigStorePort>,
}

impl UpdateConfigUseCase {
    pub fn new(store: Arc<dyn ConfigStorePort>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, patch: ConfigUpdate) -> Result<AppConfig, DnshieldError> {
        self.store.update(patch).await
    }
}
