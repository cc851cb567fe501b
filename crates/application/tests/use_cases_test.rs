mod helpers;

use dnshield_application::use_cases::{
    ClearCacheUseCase, GetStatusUseCase, PauseUseCase, RefreshRulesUseCase, ResumeUseCase,
};
use dnshield_application::ports::{BlockEnginePort, FilterDecision};
use helpers::mock_ports::{MockBlockEngine, MockCacheControl, MockNetworkControl, MockPolicyRefresh};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_get_status_reports_block_engine_counts() {
    let block_engine = Arc::new(MockBlockEngine::default());
    block_engine
        .replace_blocklist(vec!["ads.example".into(), "tracker.example".into()])
        .await
        .unwrap();
    let network = Arc::new(MockNetworkControl::default());

    let use_case = GetStatusUseCase::new(network, block_engine);
    let report = use_case.execute();

    assert_eq!(report.block_domain_count, 2);
    assert!(!report.network.paused);
}

#[tokio::test]
async fn test_pause_then_resume_round_trips_through_port() {
    let network = Arc::new(MockNetworkControl::default());
    let pause = PauseUseCase::new(network.clone());
    let resume = ResumeUseCase::new(network.clone());

    pause.execute(Duration::from_secs(60)).await.unwrap();
    assert!(network.status().paused);

    resume.execute().await.unwrap();
    assert!(!network.status().paused);
}

#[tokio::test]
async fn test_refresh_rules_delegates_to_port() {
    let refresher = Arc::new(MockPolicyRefresh::default());
    let use_case = RefreshRulesUseCase::new(refresher.clone());

    use_case.execute().await.unwrap();

    assert_eq!(refresher.trigger_count.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_clear_cache_clears_both_caches() {
    let cache = Arc::new(MockCacheControl::default());
    let use_case = ClearCacheUseCase::new(cache);

    let outcome = use_case.execute().await.unwrap();

    assert_eq!(outcome.dns_entries_cleared, 1);
    assert_eq!(outcome.cert_entries_cleared, 1);
}

#[test]
fn test_filter_decision_equality() {
    assert_eq!(FilterDecision::Block, FilterDecision::Block);
    assert_ne!(FilterDecision::Block, FilterDecision::Allow);
}
