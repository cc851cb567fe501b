//! `BypassState` — the captive-portal detector's global state (§3, §4.2).
//!
//! No direct teacher equivalent (the reference implementation has no
//! captive-portal concept); the compare-and-set discipline the design notes
//! (§9) call for is implemented with `std::sync::atomic` primitives rather
//! than a mutex, keeping the DNS handler's hot-path check lock-free.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Epoch-stamped bypass flag plus a pruned sliding-window detection map.
///
/// `until_epoch_millis` holds the bypass deadline as milliseconds since
/// this struct's creation (monotonic `Instant`-relative), 0 meaning "not
/// active". Transitions into Bypass go through `compare_exchange` so that
/// when N concurrent `record()` calls cross the threshold simultaneously,
/// exactly one of them performs the transition (§9: "implementations must
/// ensure exactly-once transition into Bypass using compare-and-set").
pub struct BypassState {
    epoch: Instant,
    until_epoch_millis: AtomicU64,
    detections: Mutex<HashMap<String, Instant>>,
}

/// Outcome of a single `record()` call, telling the caller whether this
/// call was the one that flipped the detector into Bypass (useful for
/// logging/metrics, not required for correctness).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    NoChange,
    EnteredBypass,
}

impl BypassState {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            until_epoch_millis: AtomicU64::new(0),
            detections: Mutex::new(HashMap::new()),
        }
    }

    fn now_millis(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Invariant 5 + lazy expiry: `Bypass.active` implies `now < until`; an
    /// expired bypass reads back as Idle without needing a writer to clear it.
    pub fn is_active(&self) -> bool {
        let until = self.until_epoch_millis.load(Ordering::Acquire);
        until != 0 && self.now_millis() < until
    }

    /// Record a probe-domain observation. `threshold`/`window`/`duration`
    /// come from the captive-portal config (§4.2). Returns whether this
    /// call performed the Idle→Bypass transition.
    pub fn record(&self, domain: &str, threshold: usize, window: Duration, duration: Duration) -> RecordOutcome {
        let now = Instant::now();
        let unique_count = {
            let mut detections = self.detections.lock().unwrap_or_else(|e| e.into_inner());
            detections.retain(|_, seen| now.duration_since(*seen) <= window);
            detections.insert(domain.to_string(), now);
            detections.len()
        };

        if unique_count < threshold {
            return RecordOutcome::NoChange;
        }

        let new_until = self.now_millis() + duration.as_millis() as u64;
        let current = self.until_epoch_millis.load(Ordering::Acquire);
        let already_active = current != 0 && self.now_millis() < current;
        if already_active {
            return RecordOutcome::NoChange;
        }

        // compare_exchange against the observed (possibly-expired) value so
        // that only one concurrent caller wins the Idle->Bypass transition.
        match self.until_epoch_millis.compare_exchange(
            current,
            new_until,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                self.detections.lock().unwrap_or_else(|e| e.into_inner()).clear();
                RecordOutcome::EnteredBypass
            }
            Err(_) => RecordOutcome::NoChange,
        }
    }

    /// Explicit admin `enable()`.
    pub fn enable(&self, duration: Duration) {
        let new_until = self.now_millis() + duration.as_millis() as u64;
        self.until_epoch_millis.store(new_until, Ordering::Release);
    }

    /// Explicit admin `disable()`.
    pub fn disable(&self) {
        self.until_epoch_millis.store(0, Ordering::Release);
    }
}

impl Default for BypassState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_below_threshold_does_not_activate() {
        let state = BypassState::new();
        state.record("a", 3, Duration::from_secs(10), Duration::from_secs(300));
        state.record("b", 3, Duration::from_secs(10), Duration::from_secs(300));
        assert!(!state.is_active());
    }

    #[test]
    fn test_threshold_crossing_activates_bypass() {
        let state = BypassState::new();
        state.record("a", 3, Duration::from_secs(10), Duration::from_secs(300));
        state.record("b", 3, Duration::from_secs(10), Duration::from_secs(300));
        let outcome = state.record("c", 3, Duration::from_secs(10), Duration::from_secs(300));
        assert_eq!(outcome, RecordOutcome::EnteredBypass);
        assert!(state.is_active());
    }

    #[test]
    fn test_explicit_disable_clears_bypass() {
        let state = BypassState::new();
        state.enable(Duration::from_secs(300));
        assert!(state.is_active());
        state.disable();
        assert!(!state.is_active());
    }
}
