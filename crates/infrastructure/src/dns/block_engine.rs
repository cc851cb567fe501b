//! C1 — Block Filter Engine.
//!
//! Grounded on `block_filter/engine.rs`'s `BlockFilterEngine`: the
//! compiled state is swapped atomically via `ArcSwap`, so readers never
//! contend with a reload. The per-client/group resolution layer (L−1
//! thread-local cache, CIDR `SubnetMatcher`, `client_groups` DashMap) has
//! no counterpart here — this system has one active policy per device,
//! not per-client groups, so `check` reads straight off the snapshot.

use arc_swap::ArcSwap;
use async_trait::async_trait;
use dnshield_application::ports::{BlockEnginePort, BlockEngineStats, FilterDecision};
use dnshield_domain::{BlockerState, DnshieldError};
use std::sync::Arc;
use tracing::{info, warn};

pub struct BlockEngine {
    state: ArcSwap<BlockerState>,
}

impl BlockEngine {
    pub fn new() -> Self {
        Self {
            state: ArcSwap::from_pointee(BlockerState::empty()),
        }
    }

    pub fn with_state(state: BlockerState) -> Self {
        Self {
            state: ArcSwap::from_pointee(state),
        }
    }

    /// Used by C4's hot path and the captive-portal wrapper directly,
    /// bypassing the `BlockEnginePort` trait object indirection.
    pub fn load(&self) -> Arc<BlockerState> {
        self.state.load_full()
    }
}

impl Default for BlockEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlockEnginePort for BlockEngine {
    fn check(&self, domain: &str) -> FilterDecision {
        if self.state.load().classify_blocked(domain) {
            FilterDecision::Block
        } else {
            FilterDecision::Allow
        }
    }

    async fn replace_blocklist(&self, domains: Vec<String>) -> Result<usize, DnshieldError> {
        let current = self.state.load_full();
        let (block_set, accepted) = BlockerState::build_set(domains);
        dnshield_domain::block_state::enforce_domain_count_limit(block_set.len())?;
        let next = BlockerState {
            block_set,
            allow_set: current.allow_set.clone(),
            allow_only_mode: current.allow_only_mode,
            user_label: current.user_label.clone(),
            group_label: current.group_label.clone(),
        };
        info!(accepted, total = next.block_set.len(), "block list replaced");
        self.state.store(Arc::new(next));
        Ok(accepted)
    }

    async fn replace_allowlist(&self, domains: Vec<String>) -> Result<usize, DnshieldError> {
        let current = self.state.load_full();
        let (allow_set, accepted) = BlockerState::build_set(domains);
        let next = BlockerState {
            block_set: current.block_set.clone(),
            allow_set,
            allow_only_mode: current.allow_only_mode,
            user_label: current.user_label.clone(),
            group_label: current.group_label.clone(),
        };
        info!(accepted, total = next.allow_set.len(), "allow list replaced");
        self.state.store(Arc::new(next));
        Ok(accepted)
    }

    async fn set_allow_only_mode(&self, enabled: bool) {
        let current = self.state.load_full();
        if current.allow_only_mode == enabled {
            return;
        }
        let next = BlockerState {
            block_set: current.block_set.clone(),
            allow_set: current.allow_set.clone(),
            allow_only_mode: enabled,
            user_label: current.user_label.clone(),
            group_label: current.group_label.clone(),
        };
        warn!(enabled, "allow-only mode toggled");
        self.state.store(Arc::new(next));
    }

    async fn update_metadata(&self, user: Option<String>, group: Option<String>) {
        let current = self.state.load_full();
        let next = BlockerState {
            block_set: current.block_set.clone(),
            allow_set: current.allow_set.clone(),
            allow_only_mode: current.allow_only_mode,
            user_label: user,
            group_label: group,
        };
        self.state.store(Arc::new(next));
    }

    fn stats(&self) -> BlockEngineStats {
        let state = self.state.load();
        BlockEngineStats {
            block_domain_count: state.block_set.len(),
            allow_domain_count: state.allow_set.len(),
            allow_only_mode: state.allow_only_mode,
        }
    }
}
