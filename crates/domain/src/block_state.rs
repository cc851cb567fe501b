//! `BlockerState` (§3) — the atomically-swappable policy snapshot.
//!
//! Grounded on the reference implementation's `BlockIndex`
//! (`crates/infrastructure/src/dns/block_filter/block_index.rs`), stripped
//! of per-group bitmasks and multi-source tracking: this spec's
//! `BlockerState` has no per-client grouping, only a single global block
//! set, allow set, allow-only flag and two free-text metadata labels.

use crate::errors::DnshieldError;
use crate::suffix_set::SuffixSet;

/// Default cap on the number of domains accepted by a single
/// `replace_blocklist`/`replace_allowlist` call (§4.1).
pub const MAX_DOMAINS_PER_RULE: usize = 10_000_000;

/// A fully-merged, immutable policy snapshot. Readers hold an `Arc` to one
/// instance; updates build a brand new instance and swap the pointer
/// (see `dnshield_infrastructure::dns::block_engine::BlockFilterEngine`),
/// satisfying Invariant 4 (atomic, all-or-nothing visibility).
#[derive(Debug, Default, Clone)]
pub struct BlockerState {
    pub block_set: SuffixSet,
    pub allow_set: SuffixSet,
    pub allow_only_mode: bool,
    pub user_label: Option<String>,
    pub group_label: Option<String>,
}

impl BlockerState {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Block/allow classification using only this snapshot's own sets —
    /// captive-portal membership and bypass state are cross-cutting
    /// concerns the DNS handler (C4) consults separately, per §4.1's
    /// algorithm: "returns false if domain is in the captive-portal domain
    /// set ... [before consulting] BlockSet/AllowSet".
    pub fn classify_blocked(&self, domain: &str) -> bool {
        if self.allow_set.contains_suffix(domain) {
            return false;
        }
        if self.allow_only_mode {
            return true;
        }
        self.block_set.contains_suffix(domain)
    }

    /// Build a `SuffixSet` from raw domain strings, skipping and counting
    /// invalid/oversize entries rather than failing the whole update
    /// (§4.1, §8 boundary behavior).
    pub fn build_set(domains: impl IntoIterator<Item = String>) -> (SuffixSet, usize) {
        let mut set = SuffixSet::new();
        let mut skipped = 0usize;
        for raw in domains {
            match crate::domain_name::normalize_domain(&raw) {
                Some(normalized) => set.insert(&normalized),
                None => skipped += 1,
            }
        }
        (set, skipped)
    }
}

/// Reject rule updates exceeding [`MAX_DOMAINS_PER_RULE`] before any
/// per-domain validation runs, per §4.1 and §8's boundary test
/// ("10,000,001 entries is rejected; 10,000,000 is accepted").
pub fn enforce_domain_count_limit(count: usize) -> Result<(), DnshieldError> {
    if count > MAX_DOMAINS_PER_RULE {
        Err(DnshieldError::TooManyDomains(count))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_wins_over_block() {
        let (block_set, _) = BlockerState::build_set(vec!["example.com".to_string()]);
        let (allow_set, _) = BlockerState::build_set(vec!["mail.example.com".to_string()]);
        let state = BlockerState {
            block_set,
            allow_set,
            allow_only_mode: false,
            user_label: None,
            group_label: None,
        };
        assert!(!state.classify_blocked("mail.example.com"));
        assert!(state.classify_blocked("www.example.com"));
    }

    #[test]
    fn test_allow_only_mode_blocks_everything_not_allowed() {
        let (allow_set, _) = BlockerState::build_set(vec!["intranet.corp".to_string()]);
        let state = BlockerState {
            block_set: SuffixSet::new(),
            allow_set,
            allow_only_mode: true,
            user_label: None,
            group_label: None,
        };
        assert!(state.classify_blocked("google.com"));
        assert!(!state.classify_blocked("intranet.corp"));
    }

    #[test]
    fn test_enforce_domain_count_limit_boundary() {
        assert!(enforce_domain_count_limit(MAX_DOMAINS_PER_RULE).is_ok());
        assert!(enforce_domain_count_limit(MAX_DOMAINS_PER_RULE + 1).is_err());
    }

    #[test]
    fn test_build_set_skips_invalid_entries_but_succeeds() {
        let (set, skipped) = BlockerState::build_set(vec![
            "ads.example.com".to_string(),
            "com".to_string(),
            "".to_string(),
        ]);
        assert_eq!(set.len(), 1);
        assert_eq!(skipped, 2);
    }
}
