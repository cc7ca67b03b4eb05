//! User profile entity.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Per-user settings, holding the last-resort redirect target.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub user: String,
    pub target_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(
        user: String,
        target_url: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user,
            target_url,
            created_at,
            updated_at,
        }
    }

    /// The default target, treating an empty string as unset.
    pub fn target(&self) -> Option<&str> {
        self.target_url.as_deref().filter(|url| !url.is_empty())
    }
}
