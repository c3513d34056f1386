//! Fixed-window rate limiting per client address.
//!
//! At most [`RATE_LIMIT_MAX`] accepted requests per
//! [`RATE_LIMIT_WINDOW`]; requests beyond the limit are rejected
//! outright, no queuing. Counters are process-local in-memory state
//! with no persistence guarantee, updated under one short mutex hold
//! (never across an await) so concurrent bursts cannot undercount and
//! unrelated lookups are never serialized.
//!
//! Uses `tokio::time::Instant` so window rollover is testable with a
//! paused clock.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

pub const RATE_LIMIT_MAX: u32 = 50;
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Fixed rejection message for over-limit callers.
pub const RATE_LIMIT_MESSAGE: &str =
    "Rate limit reached (max 50 calls / 15 minutes). Wait some time.";

/// Idle entries are purged once the map grows past this size.
const PURGE_THRESHOLD: usize = 1024;

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug)]
pub struct RateLimiter {
    max: u32,
    window: Duration,
    entries: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Record one request from `caller`. Returns `true` when the
    /// request is within the window budget.
    pub fn check(&self, caller: &str) -> bool {
        let now = Instant::now();
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if entries.len() >= PURGE_THRESHOLD {
            let window = self.window;
            entries.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = entries.entry(caller.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count >= self.max {
            return false;
        }
        entry.count += 1;
        true
    }
}
