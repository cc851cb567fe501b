//! `ConfigStorePort` — backs `/api/config` and `/api/config/update`
//! (§4.13). Persistence reuses `tls/ca_manager.rs`'s temp-file-then-
//! rename idiom (no chmod(0600) here — `config.toml` carries no secret
//! material, only the non-sensitive fields §4.13 exposes for editing).

use arc_swap::ArcSwap;
use async_trait::async_trait;
use dnshield_application::ports::{ConfigStorePort, ConfigUpdate};
use dnshield_domain::{AppConfig, DnshieldError};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub struct FileConfigStore {
    path: PathBuf,
    config: ArcSwap<AppConfig>,
}

impl FileConfigStore {
    pub fn new(path: PathBuf, initial: AppConfig) -> Self {
        Self { path, config: ArcSwap::from_pointee(initial) }
    }

    async fn persist(&self, config: &AppConfig) -> Result<(), DnshieldError> {
        let text = toml::to_string_pretty(config).map_err(|e| DnshieldError::config(format!("serializing config.toml: {e}")))?;
        let tmp = self.path.with_extension("toml.tmp");
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(DnshieldError::Io)?;
        }
        tokio::fs::write(&tmp, text).await.map_err(DnshieldError::Io)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(DnshieldError::Io)?;
        Ok(())
    }
}

#[async_trait]
impl ConfigStorePort for FileConfigStore {
    fn get(&self) -> AppConfig {
        (**self.config.load()).clone()
    }

    /// §4.13: only `allow_pause`/`allow_quit`/`policy_url`/`update_interval`
    /// are mutable through this endpoint; every other field is carried
    /// over unchanged from the current snapshot.
    async fn update(&self, patch: ConfigUpdate) -> Result<AppConfig, DnshieldError> {
        let mut next = self.get();

        if let Some(allow_pause) = patch.allow_pause {
            next.admin.allow_pause = allow_pause;
        }
        if let Some(allow_quit) = patch.allow_quit {
            next.admin.allow_quit = allow_quit;
        }
        if let Some(policy_url) = patch.policy_url {
            next.policy.bucket_url = Some(policy_url);
        }
        if let Some(interval) = patch.update_interval_secs {
            next.policy.refresh_interval_secs = interval;
        }

        next.validate()?;
        self.persist(&next).await?;
        self.config.store(Arc::new(next.clone()));
        info!("admin config updated");
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_update_applies_only_patched_fields() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::new(dir.path().join("config.toml"), AppConfig::default());

        let updated = store.update(ConfigUpdate { allow_pause: Some(false), ..Default::default() }).await.unwrap();
        assert!(!updated.admin.allow_pause);
        assert!(updated.admin.allow_quit);
    }

    #[tokio::test]
    async fn test_update_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let store = FileConfigStore::new(path.clone(), AppConfig::default());
        store.update(ConfigUpdate { update_interval_secs: Some(600), ..Default::default() }).await.unwrap();

        let reloaded: AppConfig = toml::from_str(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
        assert_eq!(reloaded.policy.refresh_interval_secs, 600);
    }

    #[tokio::test]
    async fn test_invalid_patch_is_rejected_and_not_persisted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let store = FileConfigStore::new(path.clone(), AppConfig::default());

        let err = store.update(ConfigUpdate { update_interval_secs: Some(0), ..Default::default() }).await;
        assert!(err.is_err());
        assert!(!path.exists());
    }
}
