use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Request header carrying the CSRF token on submissions.
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// 1 hour
pub const CSRF_TOKEN_MAX_AGE_MS: i64 = 60 * 60 * 1000;

pub const RATE_LIMIT_KEY_PREFIX: &str = "rate_limit:";
pub const DEFAULT_RATE_LIMIT_MAX: u32 = 5;
pub const DEFAULT_RATE_LIMIT_WINDOW_SECONDS: u64 = 60;

/// Floor for the store expiry so windows close to their reset are not evicted early.
pub const RATE_LIMIT_MIN_TTL_SECONDS: u64 = 60;

/// 1 MiB
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

pub const SUCCESS_MESSAGE: &str = "Thank you for your message! We'll respond within 24 hours.";
