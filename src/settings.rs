use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, str::FromStr};
use url::Url;

use crate::constants::{
    DEFAULT_MAX_BODY_BYTES, DEFAULT_RATE_LIMIT_MAX, DEFAULT_RATE_LIMIT_WINDOW_SECONDS,
};

const MIN_SECRET_LENGTH: usize = 32;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Backing store for rate-limit windows. Without it the limiter fails open.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Keeps rate-limit windows in process memory when no Redis is configured.
    #[serde(default)]
    pub in_memory_rate_limit: bool,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default)]
    pub csrf_secret: Option<String>,

    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max: u32,

    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_seconds: u64,

    #[serde(default)]
    pub resend_api_key: String,

    #[serde(default = "default_resend_api_url")]
    pub resend_api_url: String,

    #[serde(default)]
    pub recipient_email: String,

    #[serde(default)]
    pub sender_email: String,

    #[serde(default = "default_sender_name")]
    pub sender_name: String,

    #[serde(default = "default_site_name")]
    pub site_name: String,

    /// Largest submission body accepted, in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Contact-Relay".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}
fn default_rate_limit_max() -> u32 {
    DEFAULT_RATE_LIMIT_MAX
}
fn default_rate_limit_window() -> u64 {
    DEFAULT_RATE_LIMIT_WINDOW_SECONDS
}
fn default_resend_api_url() -> String {
    "https://api.resend.com".to_string()
}
fn default_sender_name() -> String {
    "Website Contact".to_string()
}
fn default_site_name() -> String {
    "website".to_string()
}
fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .try_parsing(true)
                    .ignore_empty(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;
        config.csrf_secret = config
            .csrf_secret
            .take()
            .filter(|secret| !secret.trim().is_empty());

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.resend_api_key.trim().is_empty() {
            errors.push("RESEND_API_KEY cannot be empty".to_string());
        }
        if self.recipient_email.trim().is_empty() {
            errors.push("RECIPIENT_EMAIL cannot be empty".to_string());
        }
        if self.sender_email.trim().is_empty() {
            errors.push("SENDER_EMAIL cannot be empty".to_string());
        }
        if let Err(e) = Url::parse(&self.resend_api_url) {
            errors.push(format!("RESEND_API_URL is invalid: {e}"));
        }
        if self.rate_limit_max == 0 {
            errors.push("RATE_LIMIT_MAX must be greater than zero".to_string());
        }
        if self.rate_limit_window_seconds == 0 {
            errors.push("RATE_LIMIT_WINDOW_SECONDS must be greater than zero".to_string());
        }
        if self.max_body_bytes == 0 {
            errors.push("MAX_BODY_BYTES must be greater than zero".to_string());
        }
        if self.cors_origins().is_empty() {
            errors.push("CORS_ALLOWED_ORIGINS must list at least one origin".to_string());
        }
        if self.is_production() {
            if self.cors_origins().iter().any(|o| o == "*") {
                errors.push("Wildcard CORS (*) is not allowed in production".to_string());
            }
            if self.csrf_secret.as_ref().is_some_and(|s| s.len() < MIN_SECRET_LENGTH) {
                errors.push(format!("CSRF_SECRET must be at least {MIN_SECRET_LENGTH} characters"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn sender_address(&self) -> String {
        format!("{} <{}>", self.sender_name, self.sender_email)
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.is_empty() {
            "[MISSING]"
        } else if self.len() < MIN_SECRET_LENGTH {
            "[TOO_SHORT]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for String {
    fn redact(&self) -> &str {
        self.as_str().redact()
    }
}

impl Redact for Option<String> {
    fn redact(&self) -> &str {
        self.as_deref().unwrap_or_default().redact()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("redis_url", &self.redis_url.redact())
            .field("in_memory_rate_limit", &self.in_memory_rate_limit)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("csrf_secret", &self.csrf_secret.redact())
            .field("rate_limit_max", &self.rate_limit_max)
            .field("rate_limit_window_seconds", &self.rate_limit_window_seconds)
            .field("resend_api_key", &self.resend_api_key.redact())
            .field("resend_api_url", &self.resend_api_url)
            .field("recipient_email", &self.recipient_email)
            .field("sender_email", &self.sender_email)
            .field("sender_name", &self.sender_name)
            .field("site_name", &self.site_name)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}
