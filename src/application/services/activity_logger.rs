//! Fire-and-forget activity logging.

use metrics::counter;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::warn;

use crate::domain::entities::{NewActivity, RedirectKey, RequestMeta, Resolution};
use crate::error::AppError;

/// Hands activity entries to the background worker without waiting.
///
/// Entries travel over a bounded channel to
/// [`crate::domain::activity_worker::run_activity_worker`]. When the queue is
/// full or closed the entry is dropped with a warning; the caller never sees
/// an error.
#[derive(Clone)]
pub struct ActivityLogger {
    sender: mpsc::Sender<NewActivity>,
}

impl ActivityLogger {
    pub fn new(sender: mpsc::Sender<NewActivity>) -> Self {
        Self { sender }
    }

    /// Logs the outcome of one resolution attempt.
    pub fn log_activity(
        &self,
        meta: RequestMeta,
        key: RedirectKey,
        outcome: &Result<Resolution, AppError>,
    ) {
        let activity = match outcome {
            Ok(resolution) => NewActivity::from_resolution(meta, key, resolution),
            Err(e) => NewActivity::failed(meta, key, e.to_string()),
        };

        self.enqueue(activity);
    }

    fn enqueue(&self, activity: NewActivity) {
        match self.sender.try_send(activity) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Activity queue is full, dropping entry");
                counter!("activity_dropped_total", "reason" => "full").increment(1);
            }
            Err(TrySendError::Closed(_)) => {
                warn!("Activity queue is closed, dropping entry");
                counter!("activity_dropped_total", "reason" => "closed").increment(1);
            }
        }
    }

    /// Returns `true` once the worker has stopped receiving.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Free slots in the queue.
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }
}
