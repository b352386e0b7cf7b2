use serde::{Deserialize, Serialize};

/// Fixed-window counter as persisted under `rate_limit:<client>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitWindow {
    pub count: u32,
    /// ms since epoch
    pub reset_at: i64,
}

impl RateLimitWindow {
    pub fn start(now_ms: i64, window_seconds: u64) -> Self {
        RateLimitWindow {
            count: 1,
            reset_at: now_ms + (window_seconds as i64) * 1000,
        }
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.reset_at < now_ms
    }

    pub fn increment(self) -> Self {
        RateLimitWindow {
            count: self.count.saturating_add(1),
            reset_at: self.reset_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// ms since epoch
    pub reset_at: i64,
    pub limit: u32,
}
