//! Background worker persisting activity log entries.

use std::sync::Arc;

use metrics::counter;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, info, warn};

use crate::domain::entities::NewActivity;
use crate::domain::repositories::ActivityRepository;

/// Drains the activity channel and appends each entry to the log.
///
/// At most `concurrency` writes are in flight at once. A failed write is
/// logged and dropped; there is no retry. Returns when every sender is gone
/// and all in-flight writes have finished.
pub async fn run_activity_worker(
    mut rx: mpsc::Receiver<NewActivity>,
    repository: Arc<dyn ActivityRepository>,
    concurrency: usize,
) {
    let concurrency = permit_count(concurrency);
    let permits = Arc::new(Semaphore::new(concurrency as usize));

    while let Some(activity) = rx.recv().await {
        let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
            break;
        };
        let repository = Arc::clone(&repository);

        tokio::spawn(async move {
            let _permit = permit;
            let key = activity.key.clone();
            match repository.append(activity).await {
                Ok(()) => debug!("Logged activity for {:?}", key),
                Err(e) => {
                    warn!("Failed to log activity for {:?}: {}", key, e);
                    counter!("activity_write_failures_total").increment(1);
                }
            }
        });
    }

    // Wait for in-flight writes before reporting shutdown.
    if let Err(e) = permits.acquire_many(concurrency).await {
        warn!("Could not wait for in-flight activity writes: {}", e);
    }
    info!("Activity worker stopped");
}

/// Clamps the requested concurrency to what a semaphore can wait for at once.
fn permit_count(requested: usize) -> u32 {
    let max = usize::try_from(u32::MAX).map_or(Semaphore::MAX_PERMITS, |max| {
        max.min(Semaphore::MAX_PERMITS)
    });
    let limited = requested.clamp(1, max);
    if limited != requested {
        warn!(
            "Activity worker concurrency {} out of range, using {}",
            requested, limited
        );
    }

    u32::try_from(limited).unwrap_or(1)
}
