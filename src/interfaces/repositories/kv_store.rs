use async_trait::async_trait;

use crate::errors::StoreError;

/// String key-value storage with per-entry expiry, used for rate-limit windows.
///
/// Implementations are not expected to make a read followed by a write atomic.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` when the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value, for `ttl_seconds`.
    async fn put(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError>;

    /// Checks that the backend is reachable
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
