//! Rate limiting logic and state management.

mod backend;
mod clock;
mod decision;
mod key;
mod limiter;
mod window;

pub use backend::RateLimiterBackend;
pub use clock::{Clock, ManualClock, SystemClock};
pub use decision::RateLimitDecision;
pub use key::{normalize_key, UNKNOWN_KEY};
pub use limiter::FixedWindowRateLimiter;
pub use window::{LimiterConfig, WindowEntry, DEFAULT_MAX_ENTRIES};
