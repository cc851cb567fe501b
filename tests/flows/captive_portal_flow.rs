//! Exercises C2 (captive-portal detector) wired ahead of C1 (block
//! engine) the way C4's handler orders its own pipeline: record the probe
//! query first, then skip the block check while bypass is active or the
//! domain is itself a captive-portal probe domain.

use dnshield_application::ports::{BlockEnginePort, FilterDecision};
use dnshield_domain::config::CaptivePortalConfig;
use dnshield_infrastructure::dns::{BlockEngine, CaptivePortalDetector};

fn config() -> CaptivePortalConfig {
    CaptivePortalConfig {
        enabled: true,
        threshold: 3,
        window_secs: 10,
        bypass_duration_secs: 300,
        extra_probe_domains: vec![],
    }
}

/// Mirrors C4 §4.4 steps 2 and 4: record every query against the
/// detector, then skip the block engine while bypass is active OR the
/// domain itself is a captive-portal probe domain.
fn classify(detector: &CaptivePortalDetector, engine: &BlockEngine, domain: &str) -> FilterDecision {
    detector.record(domain);
    if detector.is_active() || detector.is_exempt(domain) {
        FilterDecision::Allow
    } else {
        engine.check(domain)
    }
}

#[tokio::test]
async fn three_probe_queries_within_the_window_flip_bypass_on() {
    let engine = BlockEngine::new();
    engine.replace_blocklist(vec!["ads.example".to_string()]).await.unwrap();
    let detector = CaptivePortalDetector::new(config());

    assert_eq!(classify(&detector, &engine, "captive.apple.com"), FilterDecision::Allow);
    assert_eq!(classify(&detector, &engine, "connectivitycheck.gstatic.com"), FilterDecision::Allow);
    assert_eq!(classify(&detector, &engine, "detectportal.firefox.com"), FilterDecision::Allow);

    assert!(detector.is_active());
    // The very next query for a blocked domain is forwarded, not sinkholed.
    assert_eq!(classify(&detector, &engine, "ads.example"), FilterDecision::Allow);
}

#[tokio::test]
async fn captive_portal_domains_are_never_sinkholed_even_if_blocklisted() {
    let engine = BlockEngine::new();
    engine.replace_blocklist(vec!["captive.apple.com".to_string()]).await.unwrap();
    let detector = CaptivePortalDetector::new(config());

    // A probe domain is exempt unconditionally, well below the bypass
    // threshold and regardless of the blocklist.
    assert_eq!(classify(&detector, &engine, "captive.apple.com"), FilterDecision::Allow);
    assert_eq!(classify(&detector, &engine, "captive.apple.com"), FilterDecision::Allow);
    assert_eq!(classify(&detector, &engine, "captive.apple.com"), FilterDecision::Allow);
}

#[tokio::test]
async fn non_probe_domains_never_trip_the_threshold() {
    let engine = BlockEngine::new();
    let detector = CaptivePortalDetector::new(config());

    for _ in 0..5 {
        classify(&detector, &engine, "example.com");
    }
    assert!(!detector.is_active());
}
