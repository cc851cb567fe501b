//! `EnterpriseRuleSnapshot`/`ETagIndex` and the precedence merge (§3, §4.10).
//!
//! Net-new — shaped directly off the object-store layout and merge rules
//! the spec states, since the reference implementation has no multi-tier
//! policy concept (its "groups" are SQL rows assigned per-client, not
//! YAML tiers merged by union).

use std::collections::HashMap;

/// One rule tier as parsed from a single YAML file (`base.yaml`,
/// `groups/<group>.yaml`, or `users/overrides/<user>.yaml`).
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct RuleTier {
    #[serde(default)]
    pub block_domains: Vec<String>,
    #[serde(default)]
    pub allow_domains: Vec<String>,
    #[serde(default)]
    pub allow_only_mode: bool,
    #[serde(default)]
    pub block_sources: Vec<String>,
}

/// The resolved identity + merged rule tiers for this device, as produced
/// by one policy-fetcher refresh (C11).
#[derive(Debug, Clone)]
pub struct EnterpriseRuleSnapshot {
    pub device_name: String,
    pub user_email: Option<String>,
    pub group_name: Option<String>,
    pub base: RuleTier,
    pub group: Option<RuleTier>,
    pub user: Option<RuleTier>,
    pub fetch_time: chrono::DateTime<chrono::Utc>,
}

/// The flattened result of merging base/group/user tiers, ready to feed
/// into C1 (`replace_blocklist`/`replace_allowlist`/`set_allow_only_mode`)
/// and C12 (`block_sources`).
#[derive(Debug, Clone)]
pub struct MergedPolicy {
    pub block_domains: Vec<String>,
    pub allow_domains: Vec<String>,
    pub allow_only_mode: bool,
    pub block_sources: Vec<String>,
}

/// Precedence rule for `allow_only_mode` across tiers. `Or` is the only
/// implemented behavior (§9 open-question decision); `UserWins` is parsed
/// and accepted by config validation but falls back to `Or` with a
/// startup-time warning, so the config schema will not need to change
/// when the alternative ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowOnlyPrecedence {
    Or,
    UserWins,
}

impl Default for AllowOnlyPrecedence {
    fn default() -> Self {
        AllowOnlyPrecedence::Or
    }
}

impl EnterpriseRuleSnapshot {
    /// Union block/allow domains across tiers (lowercased + deduped by the
    /// caller via `replace_blocklist`'s own ingest validation), OR the
    /// allow-only flags, and union the external block-source URLs.
    pub fn merge(&self) -> MergedPolicy {
        let mut block_domains = self.base.block_domains.clone();
        let mut allow_domains = self.base.allow_domains.clone();
        let mut block_sources = self.base.block_sources.clone();
        let mut allow_only_mode = self.base.allow_only_mode;

        for tier in [&self.group, &self.user].into_iter().flatten() {
            block_domains.extend(tier.block_domains.iter().cloned());
            allow_domains.extend(tier.allow_domains.iter().cloned());
            block_sources.extend(tier.block_sources.iter().cloned());
            allow_only_mode |= tier.allow_only_mode;
        }

        dedup_lowercase(&mut block_domains);
        dedup_lowercase(&mut allow_domains);
        dedup_lowercase(&mut block_sources);

        MergedPolicy {
            block_domains,
            allow_domains,
            allow_only_mode,
            block_sources,
        }
    }
}

fn dedup_lowercase(values: &mut Vec<String>) {
    for v in values.iter_mut() {
        *v = v.to_ascii_lowercase();
    }
    values.sort();
    values.dedup();
}

/// `object_key -> last_seen_etag`, used to skip re-fetching unchanged
/// policy files (§4.10's conditional-fetch description).
#[derive(Debug, Clone, Default)]
pub struct EtagIndex(HashMap<String, String>);

impl EtagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, etag: impl Into<String>) {
        self.0.insert(key.into(), etag.into());
    }

    pub fn has_changed(&self, key: &str, observed_etag: &str) -> bool {
        self.get(key) != Some(observed_etag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(block: &[&str], allow: &[&str], allow_only: bool) -> RuleTier {
        RuleTier {
            block_domains: block.iter().map(|s| s.to_string()).collect(),
            allow_domains: allow.iter().map(|s| s.to_string()).collect(),
            allow_only_mode: allow_only,
            block_sources: vec![],
        }
    }

    #[test]
    fn test_merge_unions_and_ors_across_tiers() {
        let snapshot = EnterpriseRuleSnapshot {
            device_name: "laptop".into(),
            user_email: None,
            group_name: None,
            base: tier(&["Ads.example"], &[], false),
            group: Some(tier(&["tracker.example"], &[], false)),
            user: Some(tier(&[], &["intranet.corp"], true)),
            fetch_time: chrono::Utc::now(),
        };
        let merged = snapshot.merge();
        assert_eq!(merged.block_domains, vec!["ads.example".to_string(), "tracker.example".to_string()]);
        assert_eq!(merged.allow_domains, vec!["intranet.corp".to_string()]);
        assert!(merged.allow_only_mode);
    }

    #[test]
    fn test_etag_index_detects_change() {
        let mut idx = EtagIndex::new();
        assert!(idx.has_changed("base.yaml", "abc"));
        idx.set("base.yaml", "abc");
        assert!(!idx.has_changed("base.yaml", "abc"));
        assert!(idx.has_changed("base.yaml", "def"));
    }
}
