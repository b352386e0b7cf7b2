use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::{errors::StoreError, repositories::kv_store::KeyValueStore};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// Process-local store with lazy expiry. Shared between workers through the `Arc`,
/// but not between processes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every expired entry.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();

        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > now {
                return Ok(Some(entry.value.clone()));
            }
        }

        self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        Ok(None)
    }

    async fn put(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + Duration::from_secs(ttl_seconds),
            },
        );
        Ok(())
    }
}
