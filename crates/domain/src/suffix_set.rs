//! Reversed-label suffix trie backing `BlockSet`/`AllowSet` (§3, §4.1).
//!
//! Grounded on the reference implementation's
//! `crates/infrastructure/src/dns/block_filter/suffix_trie.rs`, which builds
//! the same reversed-label tree to support wildcard (`*.domain`) blocklist
//! entries. This spec's suffix semantics are simpler — "domain or any
//! parent suffix" rather than glob wildcards — so the wildcard bitmask is
//! dropped and a node is simply marked `terminal` when some inserted domain
//! ends there.

use std::collections::HashMap;

#[derive(Default, Clone)]
struct Node {
    children: HashMap<String, Node>,
    terminal: bool,
}

/// A set of domains queryable by "is `d` equal to, or a subdomain of, any
/// member of this set". Labels are stored from the TLD down (reversed),
/// so a lookup for `pagead.doubleclick.net` walks `net` → `doubleclick` →
/// `pagead`, checking `terminal` at every step — any hit along the way
/// means the query is covered by a shorter, already-inserted suffix.
#[derive(Default, Clone)]
pub struct SuffixSet {
    root: Node,
    len: usize,
}

impl SuffixSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a normalized domain. Labels must already be validated
    /// (see [`crate::domain_name::normalize_domain`]); this function does
    /// not re-validate length constraints.
    pub fn insert(&mut self, domain: &str) {
        let mut node = &mut self.root;
        for label in domain.rsplit('.') {
            node = node.children.entry(label.to_string()).or_default();
        }
        if !node.terminal {
            node.terminal = true;
            self.len += 1;
        }
    }

    /// True if `domain` equals, or is a subdomain of, any inserted entry.
    pub fn contains_suffix(&self, domain: &str) -> bool {
        let mut node = &self.root;
        for label in domain.rsplit('.') {
            match node.children.get(label) {
                Some(next) => {
                    if next.terminal {
                        return true;
                    }
                    node = next;
                }
                None => return false,
            }
        }
        false
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl FromIterator<String> for SuffixSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        let mut set = SuffixSet::new();
        for domain in iter {
            set.insert(&domain);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let mut set = SuffixSet::new();
        set.insert("ads.example.com");
        assert!(set.contains_suffix("ads.example.com"));
        assert!(!set.contains_suffix("example.com"));
    }

    #[test]
    fn test_suffix_match() {
        let mut set = SuffixSet::new();
        set.insert("doubleclick.net");
        assert!(set.contains_suffix("pagead.doubleclick.net"));
        assert!(set.contains_suffix("doubleclick.net"));
        assert!(!set.contains_suffix("doubleclickfake.net"));
    }

    #[test]
    fn test_no_cross_label_false_positive() {
        let mut set = SuffixSet::new();
        set.insert("example.com");
        assert!(!set.contains_suffix("notexample.com"));
        assert!(set.contains_suffix("www.example.com"));
    }

    #[test]
    fn test_len_dedups_identical_inserts() {
        let mut set = SuffixSet::new();
        set.insert("a.com");
        set.insert("a.com");
        assert_eq!(set.len(), 1);
    }
}
