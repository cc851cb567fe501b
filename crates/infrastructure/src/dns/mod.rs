//! DNS-side components: C1 (block engine), C2 (captive portal), C3
//! (cache), C4 (handler), C5 (listener), C6 (rate limiter), and the
//! upstream resolver pool.

pub mod block_engine;
pub mod cache;
pub mod captive_portal;
pub mod handler;
pub mod listener;
pub mod rate_limiter;
pub mod upstream;

pub use block_engine::BlockEngine;
pub use cache::DnsCache;
pub use captive_portal::CaptivePortalDetector;
pub use handler::{DnsHandler, HandlerConfig};
pub use rate_limiter::RateLimiter;
pub use upstream::UpstreamPool;
