//! Core fixed-window rate limiter implementation.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::backend::RateLimiterBackend;
use super::clock::{Clock, SystemClock};
use super::decision::RateLimitDecision;
use super::key::normalize_key;
use super::window::{LimiterConfig, WindowEntry};
use crate::error::Result;

/// A per-key fixed-window rate limiter with a bounded in-memory table.
///
/// Windows are anchored to the request that opens them, not to wall-clock
/// boundaries. The table is pruned lazily on the request path: expired
/// windows go first, then the least recently seen keys if the table is still
/// over capacity.
///
/// This struct is thread-safe and can be shared across multiple tasks. Each
/// instance owns its table; separate instances never share state.
pub struct FixedWindowRateLimiter {
    config: LimiterConfig,
    clock: Arc<dyn Clock>,
    /// Live windows indexed by normalized client key
    store: Mutex<HashMap<String, WindowEntry>>,
}

impl FixedWindowRateLimiter {
    /// Create a limiter backed by the system clock.
    pub fn new(config: LimiterConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a limiter that reads time from `clock`.
    pub fn with_clock(config: LimiterConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            clock,
            store: Mutex::new(HashMap::new()),
        })
    }

    /// Check a request for `key` at the clock's current time.
    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, self.clock.now_ms())
    }

    /// Check a request for `key` at `now` (epoch milliseconds).
    ///
    /// Pruning, lookup and increment happen under one lock, so concurrent
    /// callers can never both observe the same count.
    pub fn check_at(&self, key: &str, now: u64) -> RateLimitDecision {
        let key = normalize_key(key);
        let LimiterConfig {
            limit,
            window_ms,
            max_entries,
        } = self.config;

        trace!(key = %key, now = now, "Checking rate limit");

        let mut store = self.store.lock();

        if let Some(entry) = store.get_mut(&*key) {
            if entry.is_expired(now) {
                *entry = WindowEntry::start(now, window_ms);
                debug!(key = %key, reset_at = entry.reset_at, "Starting new rate limit window");
                return RateLimitDecision::Allowed {
                    limit,
                    remaining: limit.saturating_sub(1),
                    reset_at: entry.reset_at,
                };
            }

            entry.record(now);
            if entry.count <= limit {
                return RateLimitDecision::Allowed {
                    limit,
                    remaining: limit.saturating_sub(entry.count),
                    reset_at: entry.reset_at,
                };
            }

            let retry_after_seconds = entry.reset_at.saturating_sub(now).div_ceil(1000);
            debug!(
                key = %key,
                count = entry.count,
                retry_after_seconds = retry_after_seconds,
                "Rate limit exceeded"
            );
            return RateLimitDecision::Rejected {
                limit,
                reset_at: entry.reset_at,
                retry_after_seconds,
            };
        }

        // Only inserts grow the table, so pruning here keeps len <= max_entries
        // for every call; a prune for an existing key would always be a no-op.
        prune(&mut store, now, max_entries - 1);

        let entry = WindowEntry::start(now, window_ms);
        debug!(key = %key, reset_at = entry.reset_at, "Creating new rate limit window");
        store.insert(key.into_owned(), entry);

        RateLimitDecision::Allowed {
            limit,
            remaining: limit.saturating_sub(1),
            reset_at: entry.reset_at,
        }
    }

    /// Clear all windows.
    ///
    /// This is primarily useful for testing.
    pub fn clear(&self) {
        self.store.lock().clear();
    }

    /// Get the number of tracked keys.
    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    /// Whether no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the configuration this limiter was built with.
    pub fn config(&self) -> &LimiterConfig {
        &self.config
    }

    /// Get the current window for a key, if one is tracked.
    pub fn entry(&self, key: &str) -> Option<WindowEntry> {
        self.store.lock().get(&*normalize_key(key)).copied()
    }
}

impl RateLimiterBackend for FixedWindowRateLimiter {
    fn check(&self, key: &str) -> RateLimitDecision {
        FixedWindowRateLimiter::check(self, key)
    }
}

impl std::fmt::Debug for FixedWindowRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedWindowRateLimiter")
            .field("config", &self.config)
            .field("tracked_keys", &self.len())
            .finish()
    }
}

/// Shrink the table to at most `capacity` entries.
///
/// Expired windows are dropped first; if that is not enough, the least
/// recently seen keys are evicted. Eviction only resets a key's window, it
/// never admits more than `limit` requests inside one window.
fn prune(store: &mut HashMap<String, WindowEntry>, now: u64, capacity: usize) {
    if store.len() <= capacity {
        return;
    }

    let before = store.len();
    store.retain(|_, entry| entry.reset_at > now);
    let expired = before - store.len();

    let mut evicted = 0;
    if store.len() > capacity {
        evicted = store.len() - capacity;

        // Ties on last_seen_at fall back to key order.
        let victims: Vec<String> = if evicted == 1 {
            store
                .iter()
                .min_by_key(|(key, entry)| (entry.last_seen_at, *key))
                .map(|(key, _)| key.clone())
                .into_iter()
                .collect()
        } else {
            let mut by_last_seen: Vec<(u64, &str)> = store
                .iter()
                .map(|(key, entry)| (entry.last_seen_at, key.as_str()))
                .collect();
            by_last_seen.select_nth_unstable(evicted - 1);
            by_last_seen[..evicted]
                .iter()
                .map(|(_, key)| key.to_string())
                .collect()
        };

        for key in victims {
            store.remove(&key);
        }
    }

    debug!(
        expired = expired,
        evicted = evicted,
        tracked = store.len(),
        "Pruned rate limit table"
    );
}
