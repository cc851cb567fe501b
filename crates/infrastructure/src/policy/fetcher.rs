//! C11 — Policy Fetcher: conditional object-store fetch, identity
//! resolution, and YAML-bomb guarding (§4.10).
//!
//! Net-new; the reference implementation has no object-store or
//! multi-tenant policy concept (its per-client rules are SQL rows, not
//! YAML files fetched from S3/GCS/Azure). Shaped directly off the spec's
//! stated layout and identity-resolution algorithm, using the `object_store`
//! crate's conditional-GET support for the ETag comparisons §4.10 names.

use dnshield_domain::config::PolicyConfig;
use dnshield_domain::policy::{EnterpriseRuleSnapshot, EtagIndex, RuleTier};
use dnshield_domain::DnshieldError;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

const MAX_YAML_DEPTH: usize = 16;
const MAX_ALIAS_TO_ANCHOR_RATIO: usize = 50;

/// `user_email -> [device hostnames]`. A device name appearing under more
/// than one user is the "multiple matches" case §4.10 calls `AmbiguousDevice`.
#[derive(Debug, Deserialize, Default)]
struct DeviceMapping {
    #[serde(default)]
    devices: HashMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
struct UserGroups {
    #[serde(default)]
    user_overrides: HashMap<String, String>,
    #[serde(default)]
    groups: HashMap<String, Vec<String>>,
}

pub struct PolicyFetcher {
    store: Box<dyn ObjectStore>,
    base_prefix: ObjectPath,
    config: PolicyConfig,
    etags: Mutex<EtagIndex>,
    bodies: Mutex<HashMap<String, String>>,
    device_name: String,
}

impl PolicyFetcher {
    pub fn new(bucket_url: &str, config: PolicyConfig, device_name: String) -> Result<Self, DnshieldError> {
        let url = Url::parse(bucket_url).map_err(|e| DnshieldError::PolicyFetchFailure(format!("invalid bucket URL: {e}")))?;
        let (store, path) = object_store::parse_url(&url).map_err(|e| DnshieldError::PolicyFetchFailure(format!("unsupported object-store URL: {e}")))?;
        let base_prefix = path.parts().fold(ObjectPath::from(config.base_prefix.trim_matches('/')), |acc, part| acc.child(part));
        Ok(Self {
            store,
            base_prefix,
            config,
            etags: Mutex::new(EtagIndex::new()),
            bodies: Mutex::new(HashMap::new()),
            device_name,
        })
    }

    #[cfg(test)]
    fn with_store(store: Box<dyn ObjectStore>, config: PolicyConfig, device_name: String) -> Self {
        Self {
            store,
            base_prefix: ObjectPath::from(config.base_prefix.trim_matches('/')),
            config,
            etags: Mutex::new(EtagIndex::new()),
            bodies: Mutex::new(HashMap::new()),
            device_name,
        }
    }

    /// §4.10's end-to-end fetch: resolve identity, fetch the three rule
    /// tiers that apply, return the assembled snapshot.
    pub async fn fetch_enterprise_rules(&self) -> Result<EnterpriseRuleSnapshot, DnshieldError> {
        let device_mapping = self.fetch_yaml::<DeviceMapping>("users/device-mapping.yaml").await.unwrap_or_default();
        let user_groups = self.fetch_yaml::<UserGroups>("users/user-groups.yaml").await.unwrap_or_default();

        let user_email = resolve_user(&device_mapping, &self.device_name)?;
        let group_name = user_email.as_deref().and_then(|user| resolve_group(&user_groups, user));

        let base: RuleTier = self
            .fetch_yaml("base.yaml")
            .await
            .ok_or_else(|| DnshieldError::PolicyFetchFailure("base.yaml is missing or unparsable".to_string()))?;

        let group = match &group_name {
            Some(g) => self.fetch_yaml(&format!("groups/{g}.yaml")).await,
            None => None,
        };
        let user = match &user_email {
            Some(u) => self.fetch_yaml(&format!("users/overrides/{u}.yaml")).await,
            None => None,
        };

        Ok(EnterpriseRuleSnapshot {
            device_name: self.device_name.clone(),
            user_email,
            group_name,
            base,
            group,
            user,
            fetch_time: chrono::Utc::now(),
        })
    }

    /// Conditional fetch of one YAML object: HEAD for the ETag; a GET is
    /// only issued when the ETag has changed since the last fetch, per
    /// §4.10's conditional-fetch contract. An unchanged ETag re-parses the
    /// cached body instead of re-downloading it.
    /// Returns `None` on any failure (missing object, parse error,
    /// YAML-bomb heuristic trip) — callers decide whether that's fatal.
    async fn fetch_yaml<T: for<'de> Deserialize<'de>>(&self, relative: &str) -> Option<T> {
        let key = self.base_prefix.child(relative);

        let head = match self.store.head(&key).await {
            Ok(meta) => meta,
            Err(e) => {
                debug!(object = relative, error = %e, "policy object HEAD failed");
                return None;
            }
        };

        if head.size as u64 > self.config.max_object_size_bytes {
            warn!(object = relative, size = head.size, "policy object exceeds max size, skipping");
            return None;
        }

        let etag = head.e_tag.clone().unwrap_or_default();
        let cache_key = relative.to_string();
        let unchanged = {
            let etags = self.etags.lock().unwrap_or_else(|e| e.into_inner());
            !etags.has_changed(&cache_key, &etag)
        };

        let text = if unchanged {
            let bodies = self.bodies.lock().unwrap_or_else(|e| e.into_inner());
            match bodies.get(&cache_key) {
                Some(cached) => cached.clone(),
                // ETag recorded but no body cached yet (first run after a
                // restart): fall through and GET once to populate it.
                None => return self.fetch_and_cache(&key, &cache_key, etag).await,
            }
        } else {
            return self.fetch_and_cache(&key, &cache_key, etag).await;
        };

        parse_yaml_object(relative, &text)
    }

    /// Issues the GET, stores the body and ETag, and parses the result.
    async fn fetch_and_cache<T: for<'de> Deserialize<'de>>(&self, key: &ObjectPath, cache_key: &str, etag: String) -> Option<T> {
        let bytes = match self.store.get(key).await {
            Ok(result) => match result.bytes().await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(object = %key, error = %e, "policy object body read failed");
                    return None;
                }
            },
            Err(e) => {
                warn!(object = %key, error = %e, "policy object GET failed");
                return None;
            }
        };

        let text = String::from_utf8_lossy(&bytes).into_owned();

        {
            let mut etags = self.etags.lock().unwrap_or_else(|e| e.into_inner());
            etags.set(cache_key.to_string(), etag);
        }
        {
            let mut bodies = self.bodies.lock().unwrap_or_else(|e| e.into_inner());
            bodies.insert(cache_key.to_string(), text.clone());
        }

        parse_yaml_object(cache_key, &text)
    }
}

/// Shared by the cache-hit and cache-miss paths of `fetch_yaml`: validate
/// shape, then parse.
fn parse_yaml_object<T: for<'de> Deserialize<'de>>(relative: &str, text: &str) -> Option<T> {
    if let Err(reason) = validate_yaml_shape(text) {
        warn!(object = relative, reason, "policy object failed YAML-bomb heuristic");
        return None;
    }

    match serde_yaml::from_str(text) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(object = relative, error = %e, "policy object YAML parse failed");
            None
        }
    }
}

/// §4.10: "a shallow YAML-bomb heuristic ... (alias-to-anchor ratio,
/// nesting depth)" applied before parsing untrusted policy text.
fn validate_yaml_shape(text: &str) -> Result<(), &'static str> {
    let mut anchors = 0usize;
    let mut aliases = 0usize;
    let mut max_depth = 0usize;

    for line in text.lines() {
        let indent = line.len() - line.trim_start_matches(' ').len();
        max_depth = max_depth.max(indent / 2);

        let trimmed = line.trim_start();
        if trimmed.contains('&') {
            anchors += trimmed.matches('&').count();
        }
        if trimmed.starts_with('*') || trimmed.contains(": *") {
            aliases += 1;
        }
    }

    if max_depth > MAX_YAML_DEPTH {
        return Err("nesting depth exceeds limit");
    }
    if anchors == 0 && aliases > 0 {
        return Err("aliases present with no matching anchors");
    }
    if anchors > 0 && aliases / anchors.max(1) > MAX_ALIAS_TO_ANCHOR_RATIO {
        return Err("alias-to-anchor ratio exceeds limit");
    }

    Ok(())
}

/// §4.10 identity step 2: single user in device-mapping, or `AmbiguousDevice`.
fn resolve_user(mapping: &DeviceMapping, device_name: &str) -> Result<Option<String>, DnshieldError> {
    let matches: Vec<&String> = mapping
        .devices
        .iter()
        .filter(|(_, hosts)| hosts.iter().any(|h| h == device_name))
        .map(|(user, _)| user)
        .collect();
    match matches.len() {
        0 => Ok(None),
        1 => Ok(Some(matches[0].clone())),
        n => Err(DnshieldError::AmbiguousDevice(n)),
    }
}

/// §4.10 identity step 3: override first, else first group whose
/// assignment list contains the user (exact or `*@domain` wildcard).
fn resolve_group(user_groups: &UserGroups, user: &str) -> Option<String> {
    if let Some(group) = user_groups.user_overrides.get(user) {
        return Some(group.clone());
    }
    user_groups.groups.iter().find_map(|(group, members)| {
        members.iter().any(|member| member_matches(member, user)).then(|| group.clone())
    })
}

fn member_matches(member: &str, user: &str) -> bool {
    if let Some(domain) = member.strip_prefix("*@") {
        user.rsplit_once('@').is_some_and(|(_, user_domain)| user_domain.eq_ignore_ascii_case(domain))
    } else {
        member.eq_ignore_ascii_case(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_user_single_match() {
        let mapping = DeviceMapping { devices: HashMap::from([("alice@example.com".to_string(), vec!["laptop".to_string()])]) };
        assert_eq!(resolve_user(&mapping, "laptop").unwrap(), Some("alice@example.com".to_string()));
    }

    #[test]
    fn test_resolve_user_no_match_is_none() {
        let mapping = DeviceMapping { devices: HashMap::from([("alice@example.com".to_string(), vec!["laptop".to_string()])]) };
        assert_eq!(resolve_user(&mapping, "unknown-host").unwrap(), None);
    }

    #[test]
    fn test_resolve_user_ambiguous_fails() {
        let mapping = DeviceMapping {
            devices: HashMap::from([
                ("alice@example.com".to_string(), vec!["shared-laptop".to_string()]),
                ("bob@example.com".to_string(), vec!["shared-laptop".to_string()]),
            ]),
        };
        assert!(matches!(resolve_user(&mapping, "shared-laptop"), Err(DnshieldError::AmbiguousDevice(2))));
    }

    #[test]
    fn test_resolve_group_override_wins() {
        let user_groups = UserGroups {
            user_overrides: HashMap::from([("alice@example.com".to_string(), "engineering".to_string())]),
            groups: HashMap::from([("sales".to_string(), vec!["alice@example.com".to_string()])]),
        };
        assert_eq!(resolve_group(&user_groups, "alice@example.com"), Some("engineering".to_string()));
    }

    #[test]
    fn test_resolve_group_wildcard_domain_match() {
        let user_groups = UserGroups {
            user_overrides: HashMap::new(),
            groups: HashMap::from([("engineering".to_string(), vec!["*@example.com".to_string()])]),
        };
        assert_eq!(resolve_group(&user_groups, "bob@example.com"), Some("engineering".to_string()));
    }

    #[test]
    fn test_validate_yaml_shape_rejects_excess_depth() {
        let deeply_nested = (0..20).fold(String::new(), |acc, i| format!("{acc}{}a:\n", " ".repeat(i * 2)));
        assert!(validate_yaml_shape(&deeply_nested).is_err());
    }

    #[test]
    fn test_validate_yaml_shape_accepts_plain_document() {
        assert!(validate_yaml_shape("block_domains:\n  - ads.example\nallow_only_mode: false\n").is_ok());
    }

    async fn put_yaml(store: &object_store::memory::InMemory, path: &str, yaml: &str) {
        store
            .put(&ObjectPath::from(path), object_store::PutPayload::from(bytes::Bytes::from(yaml.to_string())))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_fetch_yaml_reparses_cached_body_when_etag_unchanged() {
        let store = object_store::memory::InMemory::new();
        put_yaml(&store, "policy/base.yaml", "block_domains:\n  - ads.example\n").await;

        let fetcher = PolicyFetcher::with_store(Box::new(store), PolicyConfig::default(), "laptop".to_string());
        let first: RuleTier = fetcher.fetch_yaml("base.yaml").await.unwrap();
        assert_eq!(first.block_domains, vec!["ads.example".to_string()]);

        // No write to the store between calls: the ETag is unchanged, so
        // this second call must be served from the cached body rather
        // than issuing another GET.
        let second: RuleTier = fetcher.fetch_yaml("base.yaml").await.unwrap();
        assert_eq!(second.block_domains, vec!["ads.example".to_string()]);
        assert_eq!(fetcher.bodies.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_yaml_refetches_when_object_changes() {
        let store = object_store::memory::InMemory::new();
        put_yaml(&store, "policy/base.yaml", "block_domains:\n  - ads.example\n").await;
        let store_handle = store.clone();

        let fetcher = PolicyFetcher::with_store(Box::new(store), PolicyConfig::default(), "laptop".to_string());
        let first: RuleTier = fetcher.fetch_yaml("base.yaml").await.unwrap();
        assert_eq!(first.block_domains, vec!["ads.example".to_string()]);

        // Object content (and thus ETag) changes: the next fetch must
        // observe the new value, not the cached one.
        put_yaml(&store_handle, "policy/base.yaml", "block_domains:\n  - tracker.example\n").await;
        let second: RuleTier = fetcher.fetch_yaml("base.yaml").await.unwrap();
        assert_eq!(second.block_domains, vec!["tracker.example".to_string()]);
    }
}
