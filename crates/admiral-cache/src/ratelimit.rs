//! Fixed-window rate limiter on top of [`Cache`].
//!
//! Window state lives in the cache as JSON, keyed by
//! `ratelimit:<namespace>:<identifier>`, so the limit is shared across
//! processes whenever the cache is. The read-then-write sequence is not
//! atomic; under concurrency a burst may slightly exceed the limit,
//! which is acceptable for login throttling.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{Cache, CacheResult};

/// Maximum attempts per window for login throttling.
pub const LOGIN_LIMIT: u32 = 5;
/// Window length for login throttling.
pub const LOGIN_WINDOW: Duration = Duration::from_secs(5 * 60);

pub fn rate_limit_key(namespace: &str, identifier: &str) -> String {
    format!("ratelimit:{namespace}:{identifier}")
}

#[derive(Debug, Serialize, Deserialize)]
struct WindowState {
    count: u32,
    /// Window end, epoch milliseconds.
    expires_at: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitResult {
    pub success: bool,
    pub limit: u32,
    /// Attempts left in the current window.
    pub remaining: u32,
    /// Window end, epoch milliseconds.
    pub reset: i64,
}

/// Record one attempt against `key` and report whether it is allowed.
///
/// A fresh or expired window resets the count to zero before the limit
/// check, so a zero limit always rejects. A full window fails the
/// attempt without extending it, so the caller's retry-after hint
/// (`reset`) stays honest.
pub async fn consume_rate_limit(
    cache: &Cache,
    key: &str,
    limit: u32,
    window: Duration,
) -> CacheResult<RateLimitResult> {
    let now = Utc::now().timestamp_millis();

    let state = match cache.get::<WindowState>(key).await? {
        Some(state) if state.expires_at > now => state,
        _ => WindowState {
            count: 0,
            expires_at: now + window.as_millis() as i64,
        },
    };

    if state.count >= limit {
        return Ok(RateLimitResult {
            success: false,
            limit,
            remaining: 0,
            reset: state.expires_at,
        });
    }

    let state = WindowState {
        count: state.count + 1,
        expires_at: state.expires_at,
    };
    // Re-arm the entry for the remainder of the window only.
    let ttl_seconds = ((state.expires_at - now) as f64 / 1000.0).ceil() as i64;
    cache.set(key, &state, ttl_seconds.max(1)).await?;

    Ok(RateLimitResult {
        success: true,
        limit,
        remaining: limit.saturating_sub(state.count),
        reset: state.expires_at,
    })
}
