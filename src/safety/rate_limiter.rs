//! Rate Limiter
//!
//! Per-tool token buckets for tools that call paid or rate-limited services.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Bucket of `capacity` calls; one call is returned every `per_call`
struct TokenBucket {
    available: u32,
    capacity: u32,
    per_call: Duration,
    refilled_at: Instant,
}

impl TokenBucket {
    fn new(capacity: u32, per_call_secs: u64) -> Self {
        Self {
            available: capacity,
            capacity,
            per_call: Duration::from_secs(per_call_secs.max(1)),
            refilled_at: Instant::now(),
        }
    }

    fn try_consume(&mut self) -> bool {
        self.refill(Instant::now());
        match self.available.checked_sub(1) {
            Some(left) => {
                self.available = left;
                true
            }
            None => false,
        }
    }

    /// Credit whole elapsed intervals, keeping the partial remainder
    fn refill(&mut self, now: Instant) {
        let intervals = now.duration_since(self.refilled_at).as_nanos() / self.per_call.as_nanos();
        let earned = intervals.min(u32::MAX as u128) as u32;
        if earned == 0 {
            return;
        }
        if self.available.saturating_add(earned) >= self.capacity {
            self.available = self.capacity;
            self.refilled_at = now;
        } else {
            self.available += earned;
            self.refilled_at += self.per_call * earned;
        }
    }

    fn reset(&mut self) {
        self.available = self.capacity;
        self.refilled_at = Instant::now();
    }
}

/// Token-bucket limiter keyed by tool name
pub struct RateLimiter {
    buckets: HashMap<String, TokenBucket>,
}

impl RateLimiter {
    /// Limits for the built-in network tools
    pub fn new() -> Self {
        let mut limiter = Self::empty();
        limiter.set_limit("search", 10, 6);
        limiter.set_limit("wikipedia", 30, 2);
        limiter.set_limit("urban_dictionary", 30, 2);
        limiter.set_limit("get_weather", 30, 2);
        limiter.set_limit("moby", 10, 6);
        limiter.set_limit("generate_image", 5, 12);
        limiter.set_limit("weekly_report", 5, 12);
        limiter
    }

    /// A limiter that allows everything until limits are set
    pub fn empty() -> Self {
        Self {
            buckets: HashMap::new(),
        }
    }

    pub fn set_limit(&mut self, tool_name: &str, max_calls: u32, refill_secs: u64) {
        self.buckets
            .insert(tool_name.to_string(), TokenBucket::new(max_calls, refill_secs));
    }

    /// Consume a token for `tool_name`; tools without a bucket are unlimited
    pub fn check_tool(&mut self, tool_name: &str) -> bool {
        match self.buckets.get_mut(tool_name) {
            Some(bucket) => bucket.try_consume(),
            None => true,
        }
    }

    pub fn reset(&mut self) {
        for bucket in self.buckets.values_mut() {
            bucket.reset();
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
