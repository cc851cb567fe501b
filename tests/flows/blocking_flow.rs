//! Exercises the blocklist/allowlist decision pipeline (C1) the way C4's
//! per-query handler consumes it, against a real `BlockEngine` — no
//! mocked port.

use dnshield_application::ports::{BlockEnginePort, FilterDecision};
use dnshield_infrastructure::dns::BlockEngine;

#[tokio::test]
async fn basic_block() {
    let engine = BlockEngine::new();
    engine.replace_blocklist(vec!["ads.example".to_string()]).await.unwrap();

    assert_eq!(engine.check("ads.example"), FilterDecision::Block);
}

#[tokio::test]
async fn suffix_block_does_not_catch_unrelated_domain() {
    let engine = BlockEngine::new();
    engine.replace_blocklist(vec!["doubleclick.net".to_string()]).await.unwrap();

    assert_eq!(engine.check("pagead.doubleclick.net"), FilterDecision::Block);
    assert_eq!(engine.check("doubleclickfake.net"), FilterDecision::Allow);
}

#[tokio::test]
async fn allow_overrides_block_for_the_allowed_subdomain_only() {
    let engine = BlockEngine::new();
    engine.replace_blocklist(vec!["example.com".to_string()]).await.unwrap();
    engine.replace_allowlist(vec!["mail.example.com".to_string()]).await.unwrap();

    assert_eq!(engine.check("mail.example.com"), FilterDecision::Allow);
    assert_eq!(engine.check("www.example.com"), FilterDecision::Block);
}

#[tokio::test]
async fn allow_only_mode_sinkholes_everything_not_on_the_allowlist() {
    let engine = BlockEngine::new();
    engine.replace_allowlist(vec!["intranet.corp".to_string()]).await.unwrap();
    engine.set_allow_only_mode(true).await;

    assert_eq!(engine.check("intranet.corp"), FilterDecision::Allow);
    assert_eq!(engine.check("google.com"), FilterDecision::Block);
}

/// `replace_blocklist` swaps the whole snapshot atomically (§8: "the next
/// `is_blocked` for any d uses D' exclusively"); a reader never observes a
/// mix of the old and new sets.
#[tokio::test]
async fn blocklist_replacement_is_not_observed_partially() {
    let engine = BlockEngine::new();
    engine.replace_blocklist(vec!["old.example".to_string()]).await.unwrap();
    assert_eq!(engine.check("old.example"), FilterDecision::Block);

    engine.replace_blocklist(vec!["new.example".to_string()]).await.unwrap();
    assert_eq!(engine.check("old.example"), FilterDecision::Allow);
    assert_eq!(engine.check("new.example"), FilterDecision::Block);
}
