//! Redirect store index maintenance.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::domain::entities::IndexStatus;
use crate::domain::repositories::RedirectRepository;

/// Keeps the unique `(user, company, job_id)` index on the redirect store.
///
/// Maintenance is best effort: failures are logged and never propagated.
#[derive(Clone)]
pub struct IndexService {
    repository: Arc<dyn RedirectRepository>,
}

impl IndexService {
    pub fn new(repository: Arc<dyn RedirectRepository>) -> Self {
        Self { repository }
    }

    /// Creates the key index if it is missing.
    ///
    /// Idempotent. Returns `None` if the check or creation failed.
    pub async fn ensure_index(&self) -> Option<IndexStatus> {
        match self.repository.ensure_key_index().await {
            Ok(IndexStatus::Created) => {
                info!("Redirect key index created");
                Some(IndexStatus::Created)
            }
            Ok(IndexStatus::AlreadyPresent) => {
                info!("Redirect key index already exists");
                Some(IndexStatus::AlreadyPresent)
            }
            Err(e) => {
                error!("Problem while applying index to redirect store: {}", e);
                None
            }
        }
    }

    /// Re-checks the index every `interval` until the task is dropped.
    ///
    /// Recreates the index if it was dropped while the service runs.
    pub async fn run_periodic(self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately; start-up already ran a check.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            self.ensure_index().await;
        }
    }
}
