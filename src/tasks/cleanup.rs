//! TTL Cleanup Task
//!
//! Background task that periodically removes expired entries from the memory
//! store behind a shared repository.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::Repository;
use crate::memory::MemoryStore;

/// Spawns a background task that periodically prunes expired entries.
///
/// Reads already hide expired entries; this only reclaims their memory.
/// The returned handle can be aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(Repository::new(MemoryStore::new(1000)));
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), 1);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(
    cache: Arc<Repository<MemoryStore>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.store().cleanup_expired();

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
