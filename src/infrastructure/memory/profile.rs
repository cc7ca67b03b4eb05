use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use crate::domain::entities::UserProfile;
use crate::domain::repositories::ProfileRepository;
use crate::error::AppError;

#[derive(Default)]
pub struct MemoryProfileRepository {
    profiles: DashMap<String, UserProfile>,
}

impl MemoryProfileRepository {
    pub fn new() -> Self {
        Self {
            profiles: DashMap::new(),
        }
    }
}

#[async_trait]
impl ProfileRepository for MemoryProfileRepository {
    async fn find(&self, user: &str) -> Result<Option<UserProfile>, AppError> {
        Ok(self.profiles.get(user).map(|profile| profile.value().clone()))
    }

    async fn upsert(&self, user: &str, target_url: &str) -> Result<UserProfile, AppError> {
        let now = Utc::now();

        let mut profile = self
            .profiles
            .entry(user.to_string())
            .or_insert_with(|| UserProfile::new(user.to_string(), None, now, now));
        profile.target_url = Some(target_url.to_string());
        profile.updated_at = now;

        Ok(profile.value().clone())
    }
}
