//! Shared state injected into HTTP handlers.

use std::sync::Arc;

use crate::application::services::{ActivityLogger, RedirectService};

#[derive(Clone)]
pub struct AppState {
    pub redirect_service: Arc<RedirectService>,
    pub activity_logger: ActivityLogger,
    /// Trust `X-Forwarded-For` / `X-Real-IP` for the logged client address.
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(
        redirect_service: Arc<RedirectService>,
        activity_logger: ActivityLogger,
        behind_proxy: bool,
    ) -> Self {
        Self {
            redirect_service,
            activity_logger,
            behind_proxy,
        }
    }
}
