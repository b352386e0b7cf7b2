use actix_web::{
    error::{PayloadError, ResponseError},
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use derive_more::Display;
use serde_json::json;
use validator::ValidationError;

use crate::entities::rate_limit::RateLimitDecision;

/// Everything the admission pipeline can answer with besides a success.
/// The `Display` text is exactly what the client sees.
#[derive(Debug, Display)]
pub enum AppError {
    #[display("{_0}")]
    Validation(String),

    #[display("{_0}")]
    Csrf(CsrfError),

    #[display("CSRF not configured")]
    CsrfNotConfigured,

    #[display("Method not allowed")]
    MethodNotAllowed,

    #[display("Request body too large")]
    PayloadTooLarge { limit: usize },

    #[display("Too many requests. Please try again later.")]
    RateLimited {
        limit: u32,
        /// Window reset, ms since epoch
        reset_at: i64,
        retry_after_secs: i64,
    },

    #[display("Failed to send email. Please try again.")]
    Upstream(EmailError),

    #[display("An unexpected error occurred. Please try again.")]
    Unexpected(String),
}

impl AppError {
    pub fn rate_limited(decision: &RateLimitDecision, now_ms: i64) -> Self {
        AppError::RateLimited {
            limit: decision.limit,
            reset_at: decision.reset_at,
            retry_after_secs: ceil_div(decision.reset_at - now_ms, 1000),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        builder.insert_header(ContentType::json());

        match self {
            AppError::RateLimited { limit, reset_at, retry_after_secs } => {
                builder
                    .insert_header(("Retry-After", retry_after_secs.to_string()))
                    .insert_header(("X-RateLimit-Limit", limit.to_string()))
                    .insert_header(("X-RateLimit-Remaining", "0"))
                    .insert_header(("X-RateLimit-Reset", ceil_div(*reset_at, 1000).to_string()))
                    .json(json!({
                        "error": self.to_string(),
                        "retryAfter": retry_after_secs,
                    }))
            }
            AppError::PayloadTooLarge { limit } => builder.json(json!({
                "error": self.to_string(),
                "maxBytes": limit,
            })),
            _ => builder.json(json!({ "error": self.to_string() })),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Csrf(_) => StatusCode::FORBIDDEN,
            AppError::CsrfNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        let message = err
            .message
            .map(|m| m.to_string())
            .unwrap_or_else(|| "Invalid value".to_string());
        AppError::Validation(message)
    }
}

impl From<CsrfError> for AppError {
    fn from(err: CsrfError) -> Self {
        AppError::Csrf(err)
    }
}

impl From<EmailError> for AppError {
    fn from(err: EmailError) -> Self {
        AppError::Upstream(err)
    }
}

impl From<PayloadError> for AppError {
    fn from(err: PayloadError) -> Self {
        AppError::Unexpected(format!("Failed to read request body: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Unexpected(format!("Invalid request body: {}", err))
    }
}

fn ceil_div(value: i64, divisor: i64) -> i64 {
    (value + divisor - 1).div_euclid(divisor)
}

/// Which part of a CSRF token failed to parse.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum TokenPart {
    #[display("format")]
    Format,

    #[display("timestamp")]
    Timestamp,
}

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum CsrfError {
    #[display("Missing CSRF token")]
    MissingToken,

    #[display("Invalid CSRF token {_0}")]
    MalformedToken(TokenPart),

    #[display("CSRF token expired")]
    Expired,

    #[display("Invalid CSRF token")]
    InvalidSignature,
}

impl std::error::Error for CsrfError {}

#[derive(Debug, Display)]
pub enum StoreError {
    #[display("Store connection failed: {_0}")]
    Connection(String),

    #[display("Store operation failed: {_0}")]
    Operation(String),

    #[display("Stored value is corrupt: {_0}")]
    Corrupt(String),
}

impl std::error::Error for StoreError {}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Operation(err.to_string())
    }
}

impl From<deadpool_redis::PoolError> for StoreError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        StoreError::Connection(err.to_string())
    }
}

#[derive(Debug, Display)]
pub enum EmailError {
    #[display("Email provider unreachable: {_0}")]
    Transport(String),

    #[display("Email provider rejected the message ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl std::error::Error for EmailError {}

impl From<reqwest::Error> for EmailError {
    fn from(err: reqwest::Error) -> Self {
        EmailError::Transport(err.to_string())
    }
}
