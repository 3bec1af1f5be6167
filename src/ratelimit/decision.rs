//! The outcome of a rate limit check.

use serde::Serialize;

/// Result of checking one request against a limiter.
///
/// A rejection is an ordinary value, not an error: callers branch on it and
/// surface it to the client as a `429`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RateLimitDecision {
    /// The request is admitted.
    Allowed {
        limit: u64,
        remaining: u64,
        reset_at: u64,
    },
    /// The key has exhausted its window.
    Rejected {
        limit: u64,
        reset_at: u64,
        retry_after_seconds: u64,
    },
}

impl RateLimitDecision {
    /// Whether the request may proceed to its handler.
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }

    /// The configured per-window limit.
    pub fn limit(&self) -> u64 {
        match *self {
            RateLimitDecision::Allowed { limit, .. } | RateLimitDecision::Rejected { limit, .. } => {
                limit
            }
        }
    }

    /// Remaining admissions in the window; always zero once rejected.
    pub fn remaining(&self) -> u64 {
        match *self {
            RateLimitDecision::Allowed { remaining, .. } => remaining,
            RateLimitDecision::Rejected { .. } => 0,
        }
    }

    /// Epoch millisecond at which the key's window ends.
    pub fn reset_at(&self) -> u64 {
        match *self {
            RateLimitDecision::Allowed { reset_at, .. }
            | RateLimitDecision::Rejected { reset_at, .. } => reset_at,
        }
    }

    /// Seconds until the window ends, rounded up; `None` when allowed.
    pub fn retry_after_seconds(&self) -> Option<u64> {
        match *self {
            RateLimitDecision::Allowed { .. } => None,
            RateLimitDecision::Rejected {
                retry_after_seconds,
                ..
            } => Some(retry_after_seconds),
        }
    }

    /// Window end rounded up to whole epoch seconds.
    pub fn reset_epoch_seconds(&self) -> u64 {
        self.reset_at().div_ceil(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_accessors() {
        let decision = RateLimitDecision::Allowed {
            limit: 10,
            remaining: 4,
            reset_at: 60_001,
        };
        assert!(decision.is_allowed());
        assert_eq!(decision.limit(), 10);
        assert_eq!(decision.remaining(), 4);
        assert_eq!(decision.retry_after_seconds(), None);
        assert_eq!(decision.reset_epoch_seconds(), 61);
    }

    #[test]
    fn test_rejected_accessors() {
        let decision = RateLimitDecision::Rejected {
            limit: 10,
            reset_at: 60_000,
            retry_after_seconds: 7,
        };
        assert!(!decision.is_allowed());
        assert_eq!(decision.remaining(), 0);
        assert_eq!(decision.retry_after_seconds(), Some(7));
        assert_eq!(decision.reset_epoch_seconds(), 60);
    }

    #[test]
    fn test_serializes_with_outcome_tag() {
        let decision = RateLimitDecision::Rejected {
            limit: 2,
            reset_at: 1_000,
            retry_after_seconds: 1,
        };
        let json = serde_json::to_value(decision).unwrap();
        assert_eq!(json["outcome"], "rejected");
        assert_eq!(json["retry_after_seconds"], 1);
    }
}
