pub mod api_key_store;
pub mod block_engine;
pub mod cache_control;
pub mod config_store;
pub mod network_control;
pub mod policy_refresh;
pub mod stats;

pub use api_key_store::ApiKeyStorePort;
pub use block_engine::{BlockEnginePort, BlockEngineStats, FilterDecision};
pub use cache_control::CacheControlPort;
pub use config_store::{ConfigStorePort, ConfigUpdate};
pub use network_control::{NetworkControlPort, NetworkStatus};
pub use policy_refresh::PolicyRefreshPort;
pub use stats::{BlockedEvent, Statistics, StatsPort};
