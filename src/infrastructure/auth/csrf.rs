use std::fmt;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::constants::CSRF_TOKEN_MAX_AGE_MS;
use crate::errors::{CsrfError, TokenPart};
use crate::settings::AppConfig;

type HmacSha256 = Hmac<Sha256>;

/// Stateless CSRF tokens of the form `<timestamp_ms>.<base64url(HMAC-SHA256(timestamp_ms))>`.
///
/// Nothing is stored server side: a token is valid for as long as its signature
/// matches under the current secret and it is no older than the max age.
#[derive(Clone)]
pub struct CsrfService {
    mac: HmacSha256,
    max_age_ms: i64,
}

impl CsrfService {
    pub fn new(secret: &str) -> Self {
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC accepts keys of any length");

        CsrfService {
            mac,
            max_age_ms: CSRF_TOKEN_MAX_AGE_MS,
        }
    }

    /// Builds the service when a secret is configured, `None` otherwise.
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        config
            .csrf_secret
            .as_deref()
            .filter(|secret| !secret.trim().is_empty())
            .map(CsrfService::new)
    }

    pub fn issue(&self) -> String {
        self.issue_at(Utc::now().timestamp_millis())
    }

    pub fn issue_at(&self, now_ms: i64) -> String {
        let timestamp = now_ms.to_string();
        let signature = self.sign(&timestamp);
        format!("{timestamp}.{signature}")
    }

    pub fn verify(&self, token: Option<&str>) -> Result<(), CsrfError> {
        self.verify_at(token, Utc::now().timestamp_millis())
    }

    pub fn verify_at(&self, token: Option<&str>, now_ms: i64) -> Result<(), CsrfError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(CsrfError::MissingToken)?;

        let mut parts = token.split('.');
        let (timestamp, signature) = match (parts.next(), parts.next(), parts.next()) {
            (Some(timestamp), Some(signature), None) => (timestamp, signature),
            _ => return Err(CsrfError::MalformedToken(TokenPart::Format)),
        };

        let issued_at: i64 = timestamp
            .parse()
            .map_err(|_| CsrfError::MalformedToken(TokenPart::Timestamp))?;

        if now_ms.saturating_sub(issued_at) > self.max_age_ms {
            return Err(CsrfError::Expired);
        }

        let expected = self.sign(timestamp);
        if !constant_time_eq(signature.as_bytes(), expected.as_bytes()) {
            return Err(CsrfError::InvalidSignature);
        }

        Ok(())
    }

    fn sign(&self, payload: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }
}

/// Compares two byte strings without short-circuiting on the first difference.
/// Only the length check can return early.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut mismatch = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        mismatch |= x ^ y;
    }

    mismatch == 0
}

impl fmt::Debug for CsrfService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsrfService")
            .field("key", &"[REDACTED]")
            .field("max_age_ms", &self.max_age_ms)
            .finish()
    }
}
