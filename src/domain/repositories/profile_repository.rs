//! Repository trait for user profiles.

use crate::domain::entities::UserProfile;
use crate::error::AppError;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Finds the profile of `user`.
    async fn find(&self, user: &str) -> Result<Option<UserProfile>, AppError>;

    /// Creates the profile or replaces its target URL.
    async fn upsert(&self, user: &str, target_url: &str) -> Result<UserProfile, AppError>;
}
