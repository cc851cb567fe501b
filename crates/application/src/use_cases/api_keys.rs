use crate::ports::ApiKeyStorePort;
use dnshield_domain::{ApiKeyRecord, DnshieldError, Role};
use std::sync::Arc;

/// Backs the CLI's `apikey create`/`revoke`/`list` subcommands (§6). Not
/// exposed over the admin HTTP surface — §4.13 lists no key-management
/// endpoint, so key issuance stays a local, CLI-only operation.
pub struct CreateApiKeyUseCase {
    store: Arc<dyn ApiKeyStorePort>,
}

impl CreateApiKeyUseCase {
    pub fn new(store: Arc<dyn ApiKeyStorePort>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, label: String, role: Role) -> Result<(ApiKeyRecord, String), DnshieldError> {
        self.store.create(label, role).await
    }
}

pub struct RevokeApiKeyUseCase {
    store: Arc<dyn ApiKeyStorePort>,
}

impl RevokeApiKeyUseCase {
    pub fn new(store: Arc<dyn ApiKeyStorePort>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, id: &str) -> Result<(), DnshieldError> {
        self.store.revoke(id).await
    }
}

pub struct ListApiKeysUseCase {
    store: Arc<dyn ApiKeyStorePort>,
}

impl ListApiKeysUseCase {
    pub fn new(store: Arc<dyn ApiKeyStorePort>) -> Self {
        Self { store }
    }

    pub fn execute(&self) -> Vec<ApiKeyRecord> {
        self.store.list()
    }
}
