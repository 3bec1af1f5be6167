//! Limiter configuration and per-key window state.

use serde::{Deserialize, Serialize};

use crate::error::{GatekeeperError, Result};

/// Default soft cap on the number of tracked keys.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Configuration for one limiter instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Maximum admitted requests per key per window
    pub limit: u64,
    /// Window duration in milliseconds
    pub window_ms: u64,
    /// Soft cap on the number of tracked keys
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

impl LimiterConfig {
    /// Create a configuration with the default entry cap.
    pub fn new(limit: u64, window_ms: u64) -> Self {
        Self {
            limit,
            window_ms,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    /// Override the entry cap.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Reject configurations that would make the limiter meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(GatekeeperError::InvalidConfiguration(
                "limit must be greater than zero".to_string(),
            ));
        }
        if self.window_ms == 0 {
            return Err(GatekeeperError::InvalidConfiguration(
                "window_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_entries == 0 {
            return Err(GatekeeperError::InvalidConfiguration(
                "max_entries must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Counter state for a single key's current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowEntry {
    /// Requests observed in the current window
    pub count: u64,
    /// Epoch millisecond at which the window ends
    pub reset_at: u64,
    /// Most recent request time, used to rank eviction candidates
    pub last_seen_at: u64,
}

impl WindowEntry {
    /// Start a new window anchored at `now`, counting the request that opened it.
    pub fn start(now: u64, window_ms: u64) -> Self {
        Self {
            count: 1,
            reset_at: now.saturating_add(window_ms),
            last_seen_at: now,
        }
    }

    /// A request exactly at `reset_at` still belongs to this window.
    pub fn is_expired(&self, now: u64) -> bool {
        now > self.reset_at
    }

    /// Count another request in this window.
    pub fn record(&mut self, now: u64) {
        self.last_seen_at = now;
        self.count = self.count.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_max_entries() {
        let config = LimiterConfig::new(60, 60_000);
        assert_eq!(config.max_entries, DEFAULT_MAX_ENTRIES);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_zero_values() {
        assert!(matches!(
            LimiterConfig::new(0, 1_000).validate(),
            Err(GatekeeperError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            LimiterConfig::new(1, 0).validate(),
            Err(GatekeeperError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            LimiterConfig::new(1, 1_000).with_max_entries(0).validate(),
            Err(GatekeeperError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_config_deserializes_without_max_entries() {
        let config: LimiterConfig = serde_yaml::from_str("limit: 5\nwindow_ms: 1000\n").unwrap();
        assert_eq!(config, LimiterConfig::new(5, 1_000));
    }

    #[test]
    fn test_entry_window_boundary() {
        let entry = WindowEntry::start(100, 1_000);
        assert_eq!(entry.reset_at, 1_100);
        assert!(!entry.is_expired(1_100));
        assert!(entry.is_expired(1_101));
    }

    #[test]
    fn test_entry_record() {
        let mut entry = WindowEntry::start(0, 1_000);
        entry.record(40);
        assert_eq!(entry.count, 2);
        assert_eq!(entry.last_seen_at, 40);
        assert_eq!(entry.reset_at, 1_000);
    }
}
