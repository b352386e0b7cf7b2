use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{entities, use_cases, validation};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{auth, email, kv, limiter, utils};

use auth::csrf::CsrfService;
use email::resend::ResendClient;
use kv::{memory_store::MemoryStore, redis_store::RedisStore};
use limiter::rate_limiter::{RateLimitConfig, RateLimiter};
use repositories::{email_sender::EmailSender, kv_store::KeyValueStore};
use use_cases::contact::{ContactHandler, Mailbox};

pub struct AppState {
    pub contact_handler: ContactHandler,
    pub rate_limiter: RateLimiter,
    /// `None` when no CSRF secret is configured; submissions are then not token-checked.
    pub csrf: Option<CsrfService>,
    pub max_body_bytes: usize,
}

impl AppState {
    /// Wires the production collaborators: Redis (or memory) for rate limiting, Resend for email.
    /// Must run inside the Tokio runtime.
    pub fn new(config: &settings::AppConfig) -> anyhow::Result<Self> {
        let store = build_store(config);
        let mailer = Arc::new(ResendClient::from_config(config)?);

        Ok(AppState::with_collaborators(config, store, mailer))
    }

    pub fn with_collaborators(
        config: &settings::AppConfig,
        store: Option<Arc<dyn KeyValueStore>>,
        mailer: Arc<dyn EmailSender>,
    ) -> Self {
        AppState {
            contact_handler: ContactHandler::new(mailer, Mailbox::from(config)),
            rate_limiter: RateLimiter::new(store, RateLimitConfig::from(config)),
            csrf: CsrfService::from_config(config),
            max_body_bytes: config.max_body_bytes,
        }
    }
}

fn build_store(config: &settings::AppConfig) -> Option<Arc<dyn KeyValueStore>> {
    if let Some(url) = config.redis_url.as_deref() {
        return RedisStore::from_url(url)
            .map(|store| Arc::new(store) as Arc<dyn KeyValueStore>)
            .map_err(|e| tracing::error!("Redis connection error: {}", e))
            .ok();
    }

    if config.in_memory_rate_limit {
        let store = MemoryStore::new();
        tokio::spawn(background_task::start_purge_task(store.clone()));
        return Some(Arc::new(store));
    }

    tracing::warn!("No rate limit store configured, every submission will be admitted");
    None
}
