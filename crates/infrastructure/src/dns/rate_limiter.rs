//! C6 — per-client-IP sliding-window rate limiter (§4.6).
//!
//! Net-new; shaped directly off the spec rather than a teacher file (the
//! reference implementation's rate limiting, where present, lives only
//! in API middleware). Reused here and by C14's admin-API limiter.

use dashmap::DashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};

struct Window {
    timestamps: Vec<Instant>,
}

pub struct RateLimiter {
    clients: DashMap<IpAddr, Window>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            clients: DashMap::new(),
            limit,
            window,
        }
    }

    /// Returns true if `client` is still within its allowance; false if
    /// this call should be dropped (§4.6: "clients exceeding the limit
    /// are silently dropped").
    pub fn check(&self, client: IpAddr) -> bool {
        let now = Instant::now();
        let mut entry = self.clients.entry(client).or_insert_with(|| Window { timestamps: Vec::new() });
        entry.timestamps.retain(|t| now.duration_since(*t) <= self.window);
        if entry.timestamps.len() as u32 >= self.limit {
            return false;
        }
        entry.timestamps.push(now);
        true
    }

    /// Garbage-collect clients unused for 2x the window, called every
    /// 5 minutes per §4.6.
    pub fn garbage_collect(&self) {
        let now = Instant::now();
        let stale_after = self.window * 2;
        self.clients.retain(|_, window| {
            window
                .timestamps
                .last()
                .is_some_and(|t| now.duration_since(*t) <= stale_after)
        });
    }

    pub fn tracked_clients(&self) -> usize {
        self.clients.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn client() -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(192, 168, 1, 50))
    }

    #[test]
    fn test_allows_up_to_limit_then_drops() {
        let limiter = RateLimiter::new(3, Duration::from_secs(10));
        assert!(limiter.check(client()));
        assert!(limiter.check(client()));
        assert!(limiter.check(client()));
        assert!(!limiter.check(client()));
    }

    #[test]
    fn test_different_clients_have_independent_budgets() {
        let limiter = RateLimiter::new(1, Duration::from_secs(10));
        assert!(limiter.check(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))));
        assert!(limiter.check(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2))));
    }

    #[test]
    fn test_garbage_collect_drops_stale_clients() {
        let limiter = RateLimiter::new(5, Duration::from_millis(1));
        limiter.check(client());
        std::thread::sleep(Duration::from_millis(10));
        limiter.garbage_collect();
        assert_eq!(limiter.tracked_clients(), 0);
    }
}
