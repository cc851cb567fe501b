//! C15 — Network DNS Manager: captures/restores per-network DNS settings
//! around filtering, pause/resume, and network changes (§4.14).
//!
//! Net-new; the reference implementation never touches OS DNS settings.
//! The periodic-watcher job shape (`CancellationToken` + jittered
//! `tokio::select!` loop) is grounded on `jobs/blocklist_sync.rs`.

use crate::network::platform_glue::PlatformGlue;
use arc_swap::ArcSwap;
use async_trait::async_trait;
use dnshield_application::ports::{NetworkControlPort, NetworkStatus};
use dnshield_domain::network::{NetworkDnsConfig, NetworkIdentity};
use dnshield_domain::DnshieldError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const LOOPBACK: &str = "127.0.0.1";
const DEFAULT_WATCHER_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Disabled,
    Filtering,
    Paused,
}

struct State {
    mode: Mode,
    current_network: NetworkIdentity,
    captured: HashMap<String, NetworkDnsConfig>,
}

/// Detects the active network and its interfaces; the only part of
/// identity resolution that isn't delegated to `PlatformGlue` directly,
/// since it composes several glue calls with the domain's keying rule.
#[async_trait]
pub trait NetworkDetector: Send + Sync {
    async fn detect(&self) -> NetworkIdentity;
    async fn active_interfaces(&self) -> Vec<String>;
}

struct Inner {
    glue: Arc<dyn PlatformGlue>,
    detector: Arc<dyn NetworkDetector>,
    state: Mutex<State>,
    pause_generation: AtomicBool,
    shutdown: CancellationToken,
    status: ArcSwap<NetworkStatus>,
}

/// Cheaply `Clone`-able handle; background tasks (the pause timer, the
/// periodic watcher) hold their own clone instead of requiring callers to
/// wrap the manager in an `Arc` themselves.
#[derive(Clone)]
pub struct NetworkDnsManager(Arc<Inner>);

impl NetworkDnsManager {
    pub fn new(glue: Arc<dyn PlatformGlue>, detector: Arc<dyn NetworkDetector>) -> Self {
        Self(Arc::new(Inner {
            glue,
            detector,
            state: Mutex::new(State {
                mode: Mode::Disabled,
                current_network: NetworkIdentity::default(),
                captured: HashMap::new(),
            }),
            pause_generation: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
            status: ArcSwap::from_pointee(NetworkStatus {
                network_id: NetworkIdentity::default().as_str().to_string(),
                filtering_active: false,
                paused: false,
                paused_until: None,
            }),
        }))
    }

    /// Lets bootstrap code trigger shutdown (`token.cancel()`) so the
    /// watcher loop and any pending pause timer exit promptly.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.0.shutdown.clone()
    }

    /// Every currently-captured per-network DNS snapshot. `NetworkDnsManager`
    /// itself never touches the filesystem (§9: only the glue has
    /// OS-specific code) — persisting these to `network-dns/network-<id>.json`
    /// is bootstrap's job, this just hands over the data.
    pub async fn captured_snapshot(&self) -> Vec<NetworkDnsConfig> {
        self.0.state.lock().await.captured.values().cloned().collect()
    }

    /// Seeds previously-persisted captures back in before the watcher
    /// starts, so a restart doesn't need to recapture a network's DNS
    /// settings it already knows.
    pub async fn seed_captured(&self, configs: Vec<NetworkDnsConfig>) {
        let mut state = self.0.state.lock().await;
        for config in configs {
            state.captured.insert(config.network_id.clone(), config);
        }
    }

    fn publish_status(&self, state: &State, paused_until: Option<chrono::DateTime<chrono::Utc>>) {
        self.0.status.store(Arc::new(NetworkStatus {
            network_id: state.current_network.as_str().to_string(),
            filtering_active: state.mode == Mode::Filtering,
            paused: state.mode == Mode::Paused,
            paused_until: if state.mode == Mode::Paused { paused_until } else { None },
        }));
    }

    /// §4.14: "capture current system DNS if not already captured; set
    /// all active interfaces to 127.0.0.1".
    pub async fn enable_filtering(&self) -> Result<(), DnshieldError> {
        let network = self.0.detector.detect().await;
        let mut state = self.0.state.lock().await;
        state.current_network = network.clone();

        if !state.captured.contains_key(network.as_str()) {
            self.capture_locked(&mut state, &network).await?;
        }

        self.set_loopback().await?;
        state.mode = Mode::Filtering;
        self.publish_status(&state, None);
        info!(network = network.as_str(), "filtering enabled");
        Ok(())
    }

    /// §4.14: "restore captured settings for the current network".
    pub async fn disable_filtering(&self) -> Result<(), DnshieldError> {
        let mut state = self.0.state.lock().await;
        self.restore_locked(&mut state).await?;
        state.mode = Mode::Disabled;
        self.publish_status(&state, None);
        info!("filtering disabled");
        Ok(())
    }

    async fn capture_locked(&self, state: &mut State, network: &NetworkIdentity) -> Result<(), DnshieldError> {
        let observed = self.0.glue.capture_dns().await?;
        let servers: Vec<String> = observed.iter().flat_map(|(_, servers, _)| servers.clone()).collect();
        let is_dhcp = observed.iter().any(|(_, _, dhcp)| *dhcp);
        let now = chrono::Utc::now();
        state.captured.insert(
            network.as_str().to_string(),
            NetworkDnsConfig { network_id: network.as_str().to_string(), captured_servers: servers, is_dhcp, captured_at: now, last_seen: now, times_seen: 1 },
        );
        Ok(())
    }

    async fn restore_locked(&self, state: &mut State) -> Result<(), DnshieldError> {
        let network = state.current_network.clone();
        let Some(config) = state.captured.get(network.as_str()).cloned() else {
            warn!(network = network.as_str(), "no captured DNS settings to restore, leaving interfaces as-is");
            return Ok(());
        };
        for interface in self.0.detector.active_interfaces().await {
            self.0.glue.set_dns(&interface, &config.captured_servers).await?;
        }
        Ok(())
    }

    async fn set_loopback(&self) -> Result<(), DnshieldError> {
        let loopback = vec![LOOPBACK.to_string()];
        for interface in self.0.detector.active_interfaces().await {
            self.0.glue.set_dns(&interface, &loopback).await?;
        }
        Ok(())
    }

    /// §4.14's periodic watcher: re-detect the active network, reconcile
    /// captured/loopback state on change.
    pub fn spawn_watcher(&self, interval: Duration) {
        let this = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = this.0.shutdown.cancelled() => {
                        info!("network watcher shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        if let Err(e) = this.reconcile().await {
                            warn!(error = %e, "network watcher reconcile failed");
                        }
                    }
                }
            }
        });
    }

    async fn reconcile(&self) -> Result<(), DnshieldError> {
        let detected = self.0.detector.detect().await;
        let mut state = self.0.state.lock().await;
        if detected == state.current_network {
            if let Some(entry) = state.captured.get_mut(detected.as_str()) {
                entry.last_seen = chrono::Utc::now();
                entry.times_seen += 1;
            }
            return Ok(());
        }

        let previous_mode = state.mode.clone();
        state.current_network = detected.clone();

        match previous_mode {
            Mode::Filtering => {
                if !state.captured.contains_key(detected.as_str()) {
                    self.capture_locked(&mut state, &detected).await?;
                }
                self.set_loopback().await?;
                info!(network = detected.as_str(), "network changed while filtering, re-applied loopback DNS");
            }
            Mode::Paused => {
                if state.captured.contains_key(detected.as_str()) {
                    self.restore_locked(&mut state).await?;
                } else {
                    state.mode = Mode::Disabled;
                    info!(network = detected.as_str(), "network changed while paused with no captured config, exiting paused state");
                }
            }
            Mode::Disabled => {}
        }
        self.publish_status(&state, None);
        Ok(())
    }

    pub fn default_watcher_interval() -> Duration {
        Duration::from_secs(DEFAULT_WATCHER_INTERVAL_SECS)
    }
}

#[async_trait]
impl NetworkControlPort for NetworkDnsManager {
    fn status(&self) -> NetworkStatus {
        (**self.0.status.load()).clone()
    }

    /// §4.14: "restore captured settings and arm a timer that re-enables
    /// on expiry".
    async fn pause(&self, duration: Duration) -> Result<(), DnshieldError> {
        let paused_until = chrono::Utc::now() + chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::zero());
        {
            let mut state = self.0.state.lock().await;
            self.restore_locked(&mut state).await?;
            state.mode = Mode::Paused;
            self.publish_status(&state, Some(paused_until));
        }

        self.0.pause_generation.store(true, Ordering::SeqCst);
        let this = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = this.0.shutdown.cancelled() => {}
                _ = tokio::time::sleep(duration) => {
                    if this.0.pause_generation.swap(false, Ordering::SeqCst) {
                        if let Err(e) = this.enable_filtering().await {
                            warn!(error = %e, "pause timer re-enable failed");
                        }
                    }
                }
            }
        });
        info!(duration_secs = duration.as_secs(), "filtering paused");
        Ok(())
    }

    /// §4.14: "cancel the pause timer and re-enable".
    async fn resume(&self) -> Result<(), DnshieldError> {
        self.0.pause_generation.store(false, Ordering::SeqCst);
        self.enable_filtering().await?;
        info!("filtering resumed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    struct FakeGlue {
        servers: StdMutex<Vec<String>>,
        set_calls: StdMutex<Vec<(String, Vec<String>)>>,
    }

    #[async_trait]
    impl PlatformGlue for FakeGlue {
        async fn capture_dns(&self) -> Result<Vec<(String, Vec<String>, bool)>, DnshieldError> {
            Ok(vec![("eth0".to_string(), self.servers.lock().unwrap().clone(), false)])
        }
        async fn set_dns(&self, interface: &str, servers: &[String]) -> Result<(), DnshieldError> {
            self.set_calls.lock().unwrap().push((interface.to_string(), servers.to_vec()));
            Ok(())
        }
        async fn install_ca_trust(&self, _cert_pem: &str) -> Result<(), DnshieldError> {
            Ok(())
        }
        async fn uninstall_ca_trust(&self) -> Result<(), DnshieldError> {
            Ok(())
        }
    }

    struct FakeDetector {
        network: Mutex<NetworkIdentity>,
        interfaces: Vec<String>,
    }

    #[async_trait]
    impl NetworkDetector for FakeDetector {
        async fn detect(&self) -> NetworkIdentity {
            self.network.lock().await.clone()
        }
        async fn active_interfaces(&self) -> Vec<String> {
            self.interfaces.clone()
        }
    }

    fn make_manager(home_servers: Vec<String>) -> (NetworkDnsManager, Arc<FakeGlue>, Arc<FakeDetector>) {
        let glue = Arc::new(FakeGlue { servers: StdMutex::new(home_servers), set_calls: StdMutex::new(Vec::new()) });
        let detector = Arc::new(FakeDetector { network: Mutex::new(NetworkIdentity::from_parts(Some("home"), None, None, None)), interfaces: vec!["eth0".to_string()] });
        let manager = NetworkDnsManager::new(glue.clone(), detector.clone());
        (manager, glue, detector)
    }

    #[tokio::test]
    async fn test_enable_filtering_captures_then_sets_loopback() {
        let (manager, glue, _detector) = make_manager(vec!["192.168.1.1".to_string()]);
        manager.enable_filtering().await.unwrap();

        let calls = glue.set_calls.lock().unwrap();
        assert_eq!(calls.last().unwrap().1, vec![LOOPBACK.to_string()]);
        assert!(manager.status().filtering_active);
    }

    #[tokio::test]
    async fn test_disable_filtering_restores_captured_servers() {
        let (manager, glue, _detector) = make_manager(vec!["192.168.1.1".to_string()]);
        manager.enable_filtering().await.unwrap();
        manager.disable_filtering().await.unwrap();

        let calls = glue.set_calls.lock().unwrap();
        assert_eq!(calls.last().unwrap().1, vec!["192.168.1.1".to_string()]);
        assert!(!manager.status().filtering_active);
    }

    #[tokio::test]
    async fn test_reconcile_on_network_change_while_filtering_recaptures() {
        let (manager, glue, detector) = make_manager(vec!["10.0.0.1".to_string()]);
        manager.enable_filtering().await.unwrap();

        *glue.servers.lock().unwrap() = vec!["10.1.0.1".to_string()];
        *detector.network.lock().await = NetworkIdentity::from_parts(Some("cafe"), None, None, None);

        manager.reconcile().await.unwrap();

        let state = manager.0.state.lock().await;
        assert!(state.captured.contains_key(detector.network.lock().await.as_str()));
        assert_eq!(state.mode, Mode::Filtering);
    }

    #[tokio::test]
    async fn test_resume_cancels_pending_reenable_and_enables_immediately() {
        let (manager, _glue, _detector) = make_manager(vec!["10.0.0.1".to_string()]);
        manager.enable_filtering().await.unwrap();
        manager.pause(Duration::from_secs(3600)).await.unwrap();

        manager.resume().await.unwrap();
        let state = manager.0.state.lock().await;
        assert_eq!(state.mode, Mode::Filtering);
        assert!(!manager.0.pause_generation.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_pause_reports_paused_status_with_deadline() {
        let (manager, _glue, _detector) = make_manager(vec!["10.0.0.1".to_string()]);
        manager.enable_filtering().await.unwrap();
        manager.pause(Duration::from_secs(60)).await.unwrap();

        let status = manager.status();
        assert!(status.paused);
        assert!(status.paused_until.is_some());
    }
}
