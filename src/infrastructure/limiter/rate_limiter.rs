use std::sync::Arc;

use chrono::Utc;

use crate::{
    constants::{RATE_LIMIT_KEY_PREFIX, RATE_LIMIT_MIN_TTL_SECONDS},
    entities::rate_limit::{RateLimitDecision, RateLimitWindow},
    errors::StoreError,
    repositories::kv_store::KeyValueStore,
    settings::AppConfig,
};

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_seconds: u64,
}

impl From<&AppConfig> for RateLimitConfig {
    fn from(config: &AppConfig) -> Self {
        RateLimitConfig {
            max_requests: config.rate_limit_max,
            window_seconds: config.rate_limit_window_seconds,
        }
    }
}

/// Fixed-window limiter keyed by client address.
///
/// The counter lives in an external store. When there is no store, or the store
/// fails, requests are let through: admission never fails because of storage.
/// Concurrent requests from one address may both read the same count, so a burst
/// can be slightly over-admitted.
#[derive(Clone)]
pub struct RateLimiter {
    store: Option<Arc<dyn KeyValueStore>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(store: Option<Arc<dyn KeyValueStore>>, config: RateLimitConfig) -> Self {
        RateLimiter { store, config }
    }

    pub fn store(&self) -> Option<&Arc<dyn KeyValueStore>> {
        self.store.as_ref()
    }

    pub fn limit(&self) -> u32 {
        self.config.max_requests
    }

    pub async fn check(&self, client: &str) -> RateLimitDecision {
        self.check_at(client, Utc::now().timestamp_millis()).await
    }

    pub async fn check_at(&self, client: &str, now_ms: i64) -> RateLimitDecision {
        let Some(store) = &self.store else {
            return self.fail_open(now_ms);
        };

        let key = window_key(client);
        match self.advance(store.as_ref(), &key, now_ms).await {
            Ok(window) => RateLimitDecision {
                allowed: window.count <= self.config.max_requests,
                remaining: self.config.max_requests.saturating_sub(window.count),
                reset_at: window.reset_at,
                limit: self.config.max_requests,
            },
            Err(e) => {
                tracing::error!(%key, error = %e, "Rate limit store error, failing open");
                self.fail_open(now_ms)
            }
        }
    }

    /// Reads the current window, counts this request in it and writes it back.
    async fn advance(
        &self,
        store: &dyn KeyValueStore,
        key: &str,
        now_ms: i64,
    ) -> Result<RateLimitWindow, StoreError> {
        let stored = match store.get(key).await? {
            Some(raw) => Some(
                serde_json::from_str::<RateLimitWindow>(&raw)
                    .map_err(|e| StoreError::Corrupt(e.to_string()))?,
            ),
            None => None,
        };

        let window = match stored {
            Some(window) if !window.is_expired(now_ms) => window.increment(),
            _ => RateLimitWindow::start(now_ms, self.config.window_seconds),
        };

        let value = serde_json::to_string(&window)
            .map_err(|e| StoreError::Operation(e.to_string()))?;
        store.put(key, &value, ttl_seconds(&window, now_ms)).await?;

        Ok(window)
    }

    fn fail_open(&self, now_ms: i64) -> RateLimitDecision {
        RateLimitDecision {
            allowed: true,
            remaining: self.config.max_requests,
            reset_at: now_ms + (self.config.window_seconds as i64) * 1000,
            limit: self.config.max_requests,
        }
    }
}

pub fn window_key(client: &str) -> String {
    format!("{}{}", RATE_LIMIT_KEY_PREFIX, client)
}

/// Seconds until the window resets, rounded up, never below the minimum TTL.
fn ttl_seconds(window: &RateLimitWindow, now_ms: i64) -> u64 {
    let remaining_ms = (window.reset_at - now_ms).max(0) as u64;
    remaining_ms.div_ceil(1000).max(RATE_LIMIT_MIN_TTL_SECONDS)
}
