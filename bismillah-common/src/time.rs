//! Timestamp utilities

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Unix timestamp (seconds) at which something stored now with `ttl` expires
pub fn expiry_from_now(ttl: Duration) -> i64 {
    now().timestamp().saturating_add(ttl.as_secs().min(i64::MAX as u64) as i64)
}
