use tokio::time::{interval, Duration};

use crate::kv::memory_store::MemoryStore;

/// Periodically drops expired rate-limit windows from the in-memory store.
pub async fn start_purge_task(store: MemoryStore) {
    let mut interval = interval(Duration::from_secs(60));

    loop {
        interval.tick().await;

        let before = store.len();
        store.purge_expired();
        let purged = before.saturating_sub(store.len());

        if purged > 0 {
            tracing::debug!("Purged {} expired rate limit windows", purged);
        }
    }
}
