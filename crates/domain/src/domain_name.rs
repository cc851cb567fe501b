//! FQDN normalization and validation (§3: Domain entity).
//!
//! Grounded on the reference implementation's `validators.rs` (free
//! functions returning a plain error), adapted to the length/label rules
//! this spec states explicitly rather than the teacher's own rule set.

/// Maximum total length of a normalized domain, per RFC 1035 §3.1.
pub const MAX_DOMAIN_LEN: usize = 253;
/// Maximum length of a single label.
pub const MAX_LABEL_LEN: usize = 63;

/// Normalize a raw domain string: trim a single trailing dot, lowercase,
/// and validate length/label constraints.
///
/// Returns `None` (rather than an error) for invalid input so callers that
/// ingest bulk lists (C1's `replace_blocklist`/`replace_allowlist`) can skip
/// and count invalid entries without aborting the whole update, per §4.1's
/// "invalid or oversize labels are skipped and counted" rule.
pub fn normalize_domain(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let without_dot = trimmed.strip_suffix('.').unwrap_or(trimmed);
    if without_dot.is_empty() || without_dot.len() > MAX_DOMAIN_LEN {
        return None;
    }
    let lowered = without_dot.to_ascii_lowercase();
    let labels: Vec<&str> = lowered.split('.').collect();
    // Reject root-suffix / TLD-only entries, resolving the allowlist
    // root-suffix open question: require at least two labels.
    if labels.len() < 2 {
        return None;
    }
    for label in &labels {
        if label.is_empty() || label.len() > MAX_LABEL_LEN {
            return None;
        }
    }
    Some(lowered)
}

/// A validated, normalized domain name. Construction always goes through
/// [`normalize_domain`], so a `DomainName` in hand is known-valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainName(String);

impl DomainName {
    pub fn parse(raw: &str) -> Option<Self> {
        normalize_domain(raw).map(DomainName)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DomainName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_trailing_dot_and_lowercases() {
        assert_eq!(normalize_domain("Ads.Example.com."), Some("ads.example.com".to_string()));
    }

    #[test]
    fn test_normalize_rejects_single_label() {
        assert_eq!(normalize_domain("com"), None);
        assert_eq!(normalize_domain(""), None);
    }

    #[test]
    fn test_normalize_rejects_oversize_label() {
        let long_label = "a".repeat(64);
        let raw = format!("{long_label}.com");
        assert_eq!(normalize_domain(&raw), None);
    }

    #[test]
    fn test_normalize_rejects_oversize_domain() {
        let raw = format!("{}.com", "a.".repeat(130));
        assert!(raw.len() > MAX_DOMAIN_LEN);
        assert_eq!(normalize_domain(&raw), None);
    }

    #[test]
    fn test_normalize_accepts_boundary_label() {
        let label = "a".repeat(63);
        let raw = format!("{label}.com");
        assert_eq!(normalize_domain(&raw), Some(raw.to_ascii_lowercase()));
    }
}
