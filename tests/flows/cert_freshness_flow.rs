//! Exercises C8's mint-then-cache behavior against a real `CaManager` +
//! `CertGenerator` pair (no mocked signing).

use dnshield_infrastructure::tls::{CaManager, CertGenerator};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

fn generator(validity: Duration) -> CertGenerator {
    let dir = tempdir().unwrap();
    let ca = Arc::new(CaManager::load_or_generate(dir.path()).unwrap());
    CertGenerator::new(ca, validity, false)
}

#[tokio::test]
async fn two_handshakes_within_the_cache_window_reuse_the_same_leaf() {
    let gen = generator(Duration::from_secs(300));

    let first = gen.get_certificate("x.test").await.unwrap();
    let second = gen.get_certificate("x.test").await.unwrap();

    assert_eq!(first.key_der, second.key_der);
    assert_eq!(first.not_after, second.not_after);
    assert_eq!(gen.cached_count(), 1);
}

#[tokio::test]
async fn the_leaf_cert_is_signed_by_the_loaded_ca() {
    let dir = tempdir().unwrap();
    let ca = Arc::new(CaManager::load_or_generate(dir.path()).unwrap());
    let gen = CertGenerator::new(ca.clone(), Duration::from_secs(300), false);

    let leaf = gen.get_certificate("x.test").await.unwrap();

    // The chain the generator hands back is [leaf, root]; the second
    // entry must be exactly the CA's own certificate DER.
    assert_eq!(leaf.cert_chain_der.len(), 2);
    assert_eq!(leaf.cert_chain_der[1], ca.identity().cert_der);
}

/// Real-clock variant of the spec's scenario 6 ("two handshakes within 4
/// min reuse the same leaf; after 6 min the cert is refreshed"). Ignored
/// by default since `CertGenerator`'s cache window floors at a 30s
/// margin below validity — exercising actual expiry means actually
/// waiting past it.
#[tokio::test]
#[ignore]
async fn cert_is_refreshed_once_the_cache_window_actually_elapses() {
    let gen = generator(Duration::from_secs(31));

    let first = gen.get_certificate("x.test").await.unwrap();
    tokio::time::sleep(Duration::from_secs(32)).await;
    let second = gen.get_certificate("x.test").await.unwrap();

    assert_ne!(first.key_der, second.key_der);
    assert_eq!(gen.cached_count(), 1);
}
