//! C2 — Captive-Portal Detector.
//!
//! Wraps [`dnshield_domain::BypassState`] with the built-in probe-domain
//! set and the configured extra parent domains (§4.2). No direct teacher
//! equivalent; the state machine itself lives in the domain crate so it
//! stays free of tokio/config types.

use dnshield_domain::bypass::RecordOutcome;
use dnshield_domain::config::CaptivePortalConfig;
use dnshield_domain::BypassState;
use std::time::Duration;
use tracing::info;

/// OS/browser captive-portal probe domains, exact-or-suffix matched.
const BUILTIN_PROBE_DOMAINS: &[&str] = &[
    "captive.apple.com",
    "gsp1.apple.com",
    "connectivitycheck.gstatic.com",
    "connectivitycheck.android.com",
    "clients3.google.com",
    "msftconnecttest.com",
    "www.msftconnecttest.com",
    "msftncsi.com",
    "detectportal.firefox.com",
    "nmcheck.gnome.org",
    "network-test.debian.org",
    "captive-portal.badssl.com",
];

pub struct CaptivePortalDetector {
    state: BypassState,
    config: CaptivePortalConfig,
}

impl CaptivePortalDetector {
    pub fn new(config: CaptivePortalConfig) -> Self {
        Self {
            state: BypassState::new(),
            config,
        }
    }

    /// Membership in the captive-portal probe-domain set (built-in +
    /// configured parents), independent of whether the detector is
    /// enabled.
    pub fn is_probe_domain(&self, domain: &str) -> bool {
        BUILTIN_PROBE_DOMAINS
            .iter()
            .any(|probe| domain == *probe || domain.ends_with(&format!(".{probe}")))
            || self
                .config
                .extra_probe_domains
                .iter()
                .any(|probe| domain == probe || domain.ends_with(&format!(".{probe}")))
    }

    /// §4.1: "returns false if domain is in the captive-portal domain
    /// set" — unconditional on bypass state, consulted by C4's block check
    /// on every query, ahead of and independent of `is_active()`.
    pub fn is_exempt(&self, domain: &str) -> bool {
        self.config.enabled && self.is_probe_domain(domain)
    }

    /// Step 2 of C4's per-query algorithm: "Record domain in C2." A
    /// no-op when the detector is disabled or the query isn't a probe.
    pub fn record(&self, domain: &str) {
        if !self.is_exempt(domain) {
            return;
        }
        let outcome = self.state.record(
            domain,
            self.config.threshold,
            Duration::from_secs(self.config.window_secs),
            Duration::from_secs(self.config.bypass_duration_secs),
        );
        if outcome == RecordOutcome::EnteredBypass {
            info!("captive portal detected, entering bypass mode");
        }
    }

    pub fn is_active(&self) -> bool {
        self.config.enabled && self.state.is_active()
    }

    pub fn enable(&self) {
        self.state.enable(Duration::from_secs(self.config.bypass_duration_secs));
    }

    pub fn disable(&self) {
        self.state.disable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CaptivePortalConfig {
        CaptivePortalConfig {
            enabled: true,
            threshold: 2,
            window_secs: 10,
            bypass_duration_secs: 300,
            extra_probe_domains: vec!["corp-captive.example".to_string()],
        }
    }

    #[test]
    fn test_non_probe_domains_never_activate() {
        let detector = CaptivePortalDetector::new(config());
        detector.record("example.com");
        detector.record("another.example");
        assert!(!detector.is_active());
    }

    #[test]
    fn test_builtin_probe_domains_activate_bypass() {
        let detector = CaptivePortalDetector::new(config());
        detector.record("captive.apple.com");
        detector.record("connectivitycheck.gstatic.com");
        assert!(detector.is_active());
    }

    #[test]
    fn test_extra_probe_domain_counts_toward_threshold() {
        let detector = CaptivePortalDetector::new(config());
        detector.record("corp-captive.example");
        detector.record("captive.apple.com");
        assert!(detector.is_active());
    }

    #[test]
    fn test_disabled_detector_never_activates() {
        let mut cfg = config();
        cfg.enabled = false;
        let detector = CaptivePortalDetector::new(cfg);
        detector.record("captive.apple.com");
        detector.record("connectivitycheck.gstatic.com");
        assert!(!detector.is_active());
    }
}
