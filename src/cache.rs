// ABOUTME: Single-slot in-memory cache for upstream review data
// ABOUTME: Handles freshness checks against a fixed one-hour window

use crate::types::Review;

/// How long a fetched payload stays fresh
pub const FRESHNESS_WINDOW_SECS: u64 = 3600;

pub const FRESHNESS_WINDOW_MS: f64 = FRESHNESS_WINDOW_SECS as f64 * 1000.0;

/// One cached upstream result
#[derive(Debug, Clone)]
pub struct CachedReviews {
    pub reviews: Vec<Review>,
    pub fetched_at_ms: f64,
}

impl CachedReviews {
    /// Seconds of freshness left, for Cache-Control on cached responses
    pub fn remaining_seconds(&self, now_ms: f64) -> u64 {
        let remaining = FRESHNESS_WINDOW_MS - (now_ms - self.fetched_at_ms);
        if remaining <= 0.0 {
            0
        } else {
            (remaining / 1000.0) as u64
        }
    }
}

/// At most one entry; a successful refresh overwrites it wholesale.
/// Empty at isolate start, discarded with the isolate.
#[derive(Debug, Default)]
pub struct ReviewCache {
    entry: Option<CachedReviews>,
}

impl ReviewCache {
    pub fn new() -> Self {
        Self { entry: None }
    }

    /// Return the cached entry while it is still inside the freshness window
    pub fn fresh(&self, now_ms: f64) -> Option<&CachedReviews> {
        self.entry
            .as_ref()
            .filter(|cached| is_fresh(now_ms, cached.fetched_at_ms))
    }

    pub fn store(&mut self, reviews: Vec<Review>, now_ms: f64) {
        self.entry = Some(CachedReviews {
            reviews,
            fetched_at_ms: now_ms,
        });
    }
}

/// Freshness predicate; an entry is stale at exactly the window boundary
pub fn is_fresh(now_ms: f64, fetched_at_ms: f64) -> bool {
    now_ms - fetched_at_ms < FRESHNESS_WINDOW_MS
}

/// Current wall-clock time in milliseconds
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}
