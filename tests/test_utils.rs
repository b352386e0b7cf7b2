#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App,
};
use async_trait::async_trait;
use mockall::mock;
use serde_json::{json, Value};

use contact_relay::{
    entities::email::OutgoingEmail,
    errors::{EmailError, StoreError},
    kv::memory_store::MemoryStore,
    middlewares::cors::{CorsHeaders, CorsPolicy},
    repositories::{email_sender::EmailSender, kv_store::KeyValueStore},
    routes::configure_routes,
    settings::{AppConfig, AppEnvironment},
    AppState,
};

pub const TEST_CSRF_SECRET: &str = "test_csrf_secret_key_that_is_long_enough_12345";
pub const PRIMARY_ORIGIN: &str = "https://example.com";
pub const SECONDARY_ORIGIN: &str = "https://www.example.com";

mock! {
    pub Mailer {}

    #[async_trait]
    impl EmailSender for Mailer {
        async fn send(&self, email: &OutgoingEmail) -> Result<Option<String>, EmailError>;
    }
}

/// A store whose backend is always down.
pub struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Connection("connection refused".into()))
    }

    async fn put(&self, _key: &str, _value: &str, _ttl_seconds: u64) -> Result<(), StoreError> {
        Err(StoreError::Connection("connection refused".into()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Connection("connection refused".into()))
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        env: AppEnvironment::Testing,
        name: "Contact Relay Test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        worker_count: 1,
        redis_url: None,
        in_memory_rate_limit: false,
        cors_allowed_origins: vec![PRIMARY_ORIGIN.to_string(), SECONDARY_ORIGIN.to_string()],
        csrf_secret: None,
        rate_limit_max: 5,
        rate_limit_window_seconds: 60,
        resend_api_key: "re_test_api_key".to_string(),
        resend_api_url: "https://api.resend.com".to_string(),
        recipient_email: "inbox@example.com".to_string(),
        sender_email: "contact@example.com".to_string(),
        sender_name: "Example Contact".to_string(),
        site_name: "example.com".to_string(),
        max_body_bytes: 1024 * 1024,
    }
}

pub fn csrf_config() -> AppConfig {
    AppConfig {
        csrf_secret: Some(TEST_CSRF_SECRET.to_string()),
        ..test_config()
    }
}

/// A mailer that must not be called.
pub fn idle_mailer() -> MockMailer {
    let mut mailer = MockMailer::new();
    mailer.expect_send().never();
    mailer
}

/// A mailer expecting exactly one message and answering with `id`.
pub fn mailer_returning(id: Option<&str>) -> MockMailer {
    let id = id.map(str::to_string);
    let mut mailer = MockMailer::new();
    mailer
        .expect_send()
        .times(1)
        .returning(move |_| Ok(id.clone()));
    mailer
}

pub fn build_state(
    config: &AppConfig,
    store: Option<Arc<dyn KeyValueStore>>,
    mailer: MockMailer,
) -> web::Data<AppState> {
    web::Data::new(AppState::with_collaborators(config, store, Arc::new(mailer)))
}

pub fn memory_store() -> Option<Arc<dyn KeyValueStore>> {
    Some(Arc::new(MemoryStore::new()))
}

pub fn build_app(
    state: web::Data<AppState>,
    config: &AppConfig,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody + use<>>,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    App::new()
        .app_data(state)
        .wrap(CorsHeaders::new(CorsPolicy::new(config.cors_origins())))
        .configure(configure_routes)
}

pub fn valid_submission() -> Value {
    json!({
        "name": "John Doe",
        "email": "john@example.com",
        "message": "This is a valid message for testing."
    })
}
