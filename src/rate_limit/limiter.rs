//! Rate Limiter
//!
//! Fixed-window request counter per (client, endpoint category). A window
//! re-anchors at the first request after the previous one elapsed.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::clock::{SharedClock, SystemClock};
use crate::rate_limit::{EndpointCategory, LimitTable};

// == Rate Window ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    pub count: u32,
    /// Unix milliseconds
    pub window_start: u64,
}

// == Rate Decision ==
/// Outcome of a single admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// When the current window ends (Unix milliseconds)
    pub reset_at_ms: u64,
    /// Whole seconds until the window ends; only set on deny
    pub retry_after_secs: Option<u64>,
}

impl RateDecision {
    /// Reset instant as Unix seconds, rounded up.
    pub fn reset_at_secs(&self) -> u64 {
        self.reset_at_ms.div_ceil(1000)
    }
}

type BucketKey = (String, EndpointCategory);

// == Rate Limiter ==
#[derive(Debug)]
pub struct RateLimiter {
    windows: HashMap<BucketKey, RateWindow>,
    limits: LimitTable,
    clock: SharedClock,
}

impl RateLimiter {
    pub fn new(limits: LimitTable) -> Self {
        Self::with_clock(limits, Arc::new(SystemClock))
    }

    pub fn with_clock(limits: LimitTable, clock: SharedClock) -> Self {
        Self {
            windows: HashMap::new(),
            limits,
            clock,
        }
    }

    pub fn limits(&self) -> &LimitTable {
        &self.limits
    }

    // == Check ==
    /// Counts one request from `identifier` against `category`.
    ///
    /// Denied requests still count, so hammering a closed window keeps it
    /// closed until it elapses.
    pub fn check(&mut self, identifier: &str, category: EndpointCategory) -> RateDecision {
        let limit = self.limits.get(category);
        let window_ms = limit.window_ms();
        let now = self.clock.now_ms();

        let window = self
            .windows
            .entry((identifier.to_string(), category))
            .or_insert(RateWindow {
                count: 0,
                window_start: now,
            });

        if now.saturating_sub(window.window_start) >= window_ms {
            window.count = 0;
            window.window_start = now;
        }

        window.count = window.count.saturating_add(1);

        let elapsed = now.saturating_sub(window.window_start);
        let reset_at_ms = window.window_start + window_ms;

        if window.count > limit.max_requests {
            let retry_after_secs = (window_ms - elapsed).div_ceil(1000).max(1);
            warn!(
                identifier,
                category = category.as_str(),
                retry_after_secs,
                "rate limit exceeded"
            );

            return RateDecision {
                allowed: false,
                limit: limit.max_requests,
                remaining: 0,
                reset_at_ms,
                retry_after_secs: Some(retry_after_secs),
            };
        }

        RateDecision {
            allowed: true,
            limit: limit.max_requests,
            remaining: limit.max_requests - window.count,
            reset_at_ms,
            retry_after_secs: None,
        }
    }

    // == Cleanup Idle ==
    /// Drops buckets whose window has elapsed. Returns how many went.
    pub fn cleanup_idle(&mut self) -> usize {
        let now = self.clock.now_ms();
        let before = self.windows.len();
        let limits = &self.limits;

        self.windows.retain(|(_, category), window| {
            now.saturating_sub(window.window_start) < limits.get(*category).window_ms()
        });

        before - self.windows.len()
    }

    pub fn bucket_count(&self) -> usize {
        self.windows.len()
    }

    /// Current window for a bucket, if one exists.
    pub fn window(&self, identifier: &str, category: EndpointCategory) -> Option<RateWindow> {
        self.windows
            .get(&(identifier.to_string(), category))
            .copied()
    }
}
