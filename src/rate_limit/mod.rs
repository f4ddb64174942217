//! Fixed-window request counters held in a bounded LRU cache.
//!
//! Each key owns a window that opens on its first check and lasts `window`.
//! Checks inside the window do not extend it. Because windows are fixed, a
//! caller can get up to `2 × limit` requests through around a window boundary.

use std::num::NonZeroUsize;
use std::time::Duration;

use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::Instant;

use crate::config::RateLimitConfig;

mod key;

pub use key::RateLimitKey;

/// Outcome of a single [`RateLimiter::check`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
}

impl RateLimitDecision {
    fn allow(remaining: u32) -> Self {
        Self {
            allowed: true,
            remaining,
        }
    }

    fn deny() -> Self {
        Self {
            allowed: false,
            remaining: 0,
        }
    }
}

#[derive(Debug)]
struct Window {
    count: u32,
    started: Instant,
}

/// Applies one check to the cache. `get_mut` refreshes recency, so the entry
/// `push` evicts at capacity is always the least recently checked key.
fn check_window(
    windows: &mut LruCache<String, Window>,
    key: &str,
    limit: u32,
    now: Instant,
    span: Duration,
) -> RateLimitDecision {
    if let Some(window) = windows.get_mut(key) {
        if now.duration_since(window.started) < span {
            if window.count >= limit {
                return RateLimitDecision::deny();
            }

            window.count += 1;
            return RateLimitDecision::allow(limit - window.count);
        }
    }

    // Expired windows leave the cache before the key starts over.
    windows.pop(key);

    if limit == 0 {
        return RateLimitDecision::deny();
    }

    let fresh = Window {
        count: 1,
        started: now,
    };
    if let Some((evicted, _)) = windows.push(key.to_owned(), fresh) {
        tracing::debug!("Rate limit entry for '{}' evicted at capacity", evicted);
    }

    RateLimitDecision::allow(limit - 1)
}

/// Snapshot of limiter occupancy for diagnostics.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct RateLimitStats {
    pub tracked_keys: usize,
    pub capacity: usize,
    pub window_ms: u64,
}

/// Process-wide throttle shared by handlers through application state.
///
/// All reads and writes go through one mutex, so concurrent checks on the same
/// key never lose an increment and never both claim the last slot.
#[derive(Debug)]
pub struct RateLimiter {
    windows: Mutex<LruCache<String, Window>>,
    window: Duration,
}

impl RateLimiter {
    pub fn new(capacity: NonZeroUsize, window: Duration) -> Self {
        Self {
            windows: Mutex::new(LruCache::new(capacity)),
            window,
        }
    }

    /// Returns `None` when the configured capacity is zero.
    pub fn from_config(config: &RateLimitConfig) -> Option<Self> {
        NonZeroUsize::new(config.capacity).map(|capacity| Self::new(capacity, config.window))
    }

    /// Counts one attempt for `key` against `limit` attempts per window.
    ///
    /// A `limit` of zero always denies and records nothing.
    pub fn check(&self, key: &str, limit: u32) -> RateLimitDecision {
        let now = Instant::now();
        let decision = check_window(&mut self.windows.lock(), key, limit, now, self.window);

        if !decision.allowed {
            tracing::debug!("Rate limit reached for '{}' (limit {})", key, limit);
        }
        decision
    }

    pub fn stats(&self) -> RateLimitStats {
        let windows = self.windows.lock();
        RateLimitStats {
            tracked_keys: windows.len(),
            capacity: windows.cap().get(),
            window_ms: self.window.as_millis() as u64,
        }
    }
}
