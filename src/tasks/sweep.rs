//! Expiry Sweep Task
//!
//! Background task that periodically purges stale cache entries.
//!
//! Without it, stale entries are only dropped when their URL is requested
//! again. The sweep only removes entries past their TTL; it never evicts
//! fresh ones.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoryCache;

/// Spawns a background task that purges expired entries every
/// `interval_secs` seconds.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(MemoryCache::new(60)?);
/// let sweep_handle = spawn_sweep_task(cache.clone(), 30);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(cache: Arc<MemoryCache>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired();
            if removed > 0 {
                info!("Expiry sweep: removed {} stale entries", removed);
            } else {
                debug!("Expiry sweep: no stale entries found");
            }
        }
    })
}
