//! Client key normalization.

use std::borrow::Cow;

/// Key shared by every client that cannot be identified.
pub const UNKNOWN_KEY: &str = "unknown";

/// Normalize a caller-supplied key.
///
/// Empty and whitespace-only keys collapse onto [`UNKNOWN_KEY`] so that
/// unidentifiable clients share one counter instead of each escaping the limit.
pub fn normalize_key(key: &str) -> Cow<'_, str> {
    if key.trim().is_empty() {
        Cow::Borrowed(UNKNOWN_KEY)
    } else {
        Cow::Borrowed(key)
    }
}
